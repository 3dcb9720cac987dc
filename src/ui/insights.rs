use eframe::egui::{RichText, Ui};

const KEY_INSIGHTS: [&str; 4] = [
    "Watch time and views are the strongest revenue drivers",
    "Engagement metrics have secondary impact",
    "Device and country affect monetization rates",
    "Linear and tree-based models perform competitively",
];

const RECOMMENDATIONS: [&str; 4] = [
    "Focus on increasing watch time and retention",
    "Optimize content for high-performing devices",
    "Target high-revenue regions",
    "Use ML predictions for content planning and forecasting",
];

pub fn business_insights(ui: &mut Ui) {
    ui.heading("📌 Business Insights & Recommendations");
    ui.add_space(8.0);

    ui.label(RichText::new("📊 Key Insights").size(18.0).strong());
    for line in KEY_INSIGHTS {
        ui.label(format!("✅ {line}"));
    }
    ui.add_space(10.0);

    ui.label(RichText::new("🎯 Recommendations").size(18.0).strong());
    for line in RECOMMENDATIONS {
        ui.label(format!("🔹 {line}"));
    }
}

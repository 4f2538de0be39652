use tracing::info;

use crate::{
    app_error::AppResult,
    application::use_cases::plan::{PlanInput, PlanRepo},
    domain::entities::plan::PeriodType,
};

struct SeedPlan {
    name: &'static str,
    description: &'static str,
    price: f64,
    duration: i32,
    period_type: PeriodType,
    features: &'static [&'static str],
    is_popular: bool,
    service_icon: &'static str,
    service_type: &'static str,
    service_url: &'static str,
}

const STARTER_CATALOG: &[SeedPlan] = &[
    SeedPlan {
        name: "Netflix Standard",
        description: "Streaming films and series",
        price: 699.0,
        duration: 1,
        period_type: PeriodType::Months,
        features: &["HD quality", "Full library"],
        is_popular: true,
        service_icon: "netflix.png",
        service_type: "streaming",
        service_url: "https://netflix.com",
    },
    SeedPlan {
        name: "Spotify Premium",
        description: "Music and podcasts without ads",
        price: 199.0,
        duration: 1,
        period_type: PeriodType::Months,
        features: &["No ads", "Offline listening"],
        is_popular: true,
        service_icon: "spotify.png",
        service_type: "music",
        service_url: "https://spotify.com",
    },
    SeedPlan {
        name: "Spotify Premium",
        description: "Music and podcasts without ads, billed yearly",
        price: 1990.0,
        duration: 1,
        period_type: PeriodType::Years,
        features: &["No ads", "Offline listening"],
        is_popular: false,
        service_icon: "spotify.png",
        service_type: "music",
        service_url: "https://spotify.com",
    },
    SeedPlan {
        name: "YouTube Premium",
        description: "YouTube without ads",
        price: 329.0,
        duration: 1,
        period_type: PeriodType::Months,
        features: &["No ads", "Background playback", "YouTube Music"],
        is_popular: true,
        service_icon: "youtube_premium.png",
        service_type: "streaming",
        service_url: "https://youtube.com/premium",
    },
    SeedPlan {
        name: "Google One 100GB",
        description: "Cloud storage for photos and files",
        price: 139.0,
        duration: 1,
        period_type: PeriodType::Months,
        features: &["100 GB storage"],
        is_popular: false,
        service_icon: "google_one.png",
        service_type: "cloud",
        service_url: "https://one.google.com",
    },
    SeedPlan {
        name: "Microsoft 365 Personal",
        description: "Office apps and cloud storage",
        price: 399.0,
        duration: 30,
        period_type: PeriodType::Days,
        features: &["Word", "Excel", "1 TB OneDrive"],
        is_popular: false,
        service_icon: "microsoft_365.png",
        service_type: "productivity",
        service_url: "https://microsoft.com/microsoft-365",
    },
];

impl SeedPlan {
    fn to_input(&self) -> PlanInput {
        PlanInput {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            price: self.price,
            duration: self.duration,
            period_type: self.period_type,
            features: self.features.iter().map(|f| f.to_string()).collect(),
            is_popular: self.is_popular,
            is_active: true,
            service_icon: Some(self.service_icon.to_string()),
            service_type: Some(self.service_type.to_string()),
            service_url: Some(self.service_url.to_string()),
        }
    }
}

/// Inserts the starter catalog into an empty plans table. Returns how many plans were added.
pub async fn seed_catalog(plan_repo: &dyn PlanRepo) -> AppResult<usize> {
    if plan_repo.count().await? > 0 {
        info!("Plan catalog already populated, skipping seed");
        return Ok(0);
    }

    for seed in STARTER_CATALOG {
        plan_repo.create(&seed.to_input()).await?;
    }

    info!(count = STARTER_CATALOG.len(), "Seeded plan catalog");
    Ok(STARTER_CATALOG.len())
}

//! Default catalog used to seed empty stores.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::platforms::{NewPlatform, PlatformType};
use crate::services::NewService;

/// A default service, attached to whichever stored platform has
/// `platform_slug` when seeding.
#[derive(Debug, Clone)]
pub struct DefaultService {
    pub platform_slug: &'static str,
    pub service: NewService,
}

fn platform(
    name: &str,
    slug: &str,
    color: &str,
    platform_type: PlatformType,
    website: &str,
    description: &str,
) -> NewPlatform {
    NewPlatform {
        name: name.to_string(),
        slug: Some(slug.to_string()),
        icon: Some(slug.to_string()),
        color: Some(color.to_string()),
        platform_type: Some(platform_type),
        active: Some(true),
        website: Some(website.to_string()),
        description: Some(description.to_string()),
    }
}

/// The five default platforms, in display order.
pub fn default_platforms() -> Vec<NewPlatform> {
    vec![
        platform(
            "Instagram",
            "instagram",
            "#E1306C",
            PlatformType::Social,
            "https://instagram.com",
            "Photo and video sharing",
        ),
        platform(
            "Facebook",
            "facebook",
            "#1877F2",
            PlatformType::Social,
            "https://facebook.com",
            "Social network",
        ),
        platform(
            "Twitter",
            "twitter",
            "#1DA1F2",
            PlatformType::Social,
            "https://twitter.com",
            "Microblogging",
        ),
        platform(
            "YouTube",
            "youtube",
            "#FF0000",
            PlatformType::Video,
            "https://youtube.com",
            "Video sharing",
        ),
        platform(
            "TikTok",
            "tiktok",
            "#000000",
            PlatformType::Video,
            "https://tiktok.com",
            "Short-form video",
        ),
    ]
}

fn service(
    platform_slug: &'static str,
    name: &str,
    description: &str,
    price: Decimal,
    min_quantity: i64,
    max_quantity: i64,
) -> DefaultService {
    let mut service = NewService::new(name, "", price).with_quantities(min_quantity, max_quantity);
    service.active = Some(true);
    service.description = Some(description.to_string());
    DefaultService {
        platform_slug,
        service,
    }
}

/// The default services. `platform_id` is left empty and filled in when the
/// owning platform is known.
pub fn default_services() -> Vec<DefaultService> {
    vec![
        service("instagram", "Instagram Followers", "Grow your followers", dec!(5.00), 100, 10_000),
        service("instagram", "Instagram Likes", "Boost likes on your posts", dec!(3.50), 50, 5_000),
        service("instagram", "Instagram Comments", "Get more comments", dec!(8.00), 10, 500),
        service("facebook", "Facebook Page Followers", "Grow your page audience", dec!(6.00), 100, 10_000),
        service("facebook", "Facebook Post Likes", "Boost likes on your posts", dec!(4.00), 50, 5_000),
        service("twitter", "Twitter Followers", "Grow your followers", dec!(7.00), 100, 10_000),
        service("twitter", "Twitter Likes", "Boost likes on your tweets", dec!(4.25), 50, 5_000),
        service("youtube", "YouTube Views", "Increase video views", dec!(10.00), 500, 50_000),
        service("youtube", "YouTube Subscribers", "Grow your channel subscribers", dec!(12.00), 100, 10_000),
        service("tiktok", "TikTok Followers", "Grow your followers", dec!(6.00), 100, 10_000),
        service("tiktok", "TikTok Likes", "Boost likes on your videos", dec!(5.00), 100, 10_000),
        service("tiktok", "TikTok Views", "Increase video views", dec!(4.50), 1_000, 100_000),
    ]
}

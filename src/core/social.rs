use crate::core::{SocialLink, SocialPlatform};

/// B2C categories that perform better on Instagram.
pub const INSTAGRAM_CATEGORIES: &[&str] = &[
    "cafe",
    "restaurant",
    "bakery",
    "bar",
    "night_club",
    "clothing_store",
    "beauty_salon",
    "spa",
    "gym",
    "florist",
    "meal_delivery",
    "meal_takeaway",
    "store",
    "shopping_mall",
    "tourist_attraction",
];

/// 依商家類型決定 Instagram 或 LinkedIn 搜尋連結
pub fn social_link(name: &str, types: &[String]) -> SocialLink {
    let is_insta = types
        .iter()
        .any(|t| INSTAGRAM_CATEGORIES.contains(&t.as_str()));

    if is_insta {
        SocialLink {
            platform: SocialPlatform::Instagram,
            url: format!(
                "https://www.instagram.com/explore/tags/{}/",
                name.replace(' ', "").to_lowercase()
            ),
        }
    } else {
        SocialLink {
            platform: SocialPlatform::LinkedIn,
            url: format!(
                "https://www.linkedin.com/search/results/all/?keywords={}",
                name.replace(' ', "%20")
            ),
        }
    }
}

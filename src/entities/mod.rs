pub mod callouts;
pub mod contributions;
pub mod creators;
pub mod gifts;
pub mod orders;
pub mod posts;
pub mod social_links;
pub mod spoil_items;
pub mod sponsors;
pub mod tier_subscriptions;
pub mod tiers;

pub use callouts as callout_entity;
pub use contributions as contribution_entity;
pub use creators as creator_entity;
pub use gifts as gift_entity;
pub use orders as order_entity;
pub use posts as post_entity;
pub use social_links as social_link_entity;
pub use spoil_items as spoil_item_entity;
pub use sponsors as sponsor_entity;
pub use tier_subscriptions as tier_subscription_entity;
pub use tiers as tier_entity;

pub use gifts::GiftType;
pub use orders::PaymentStatus;
pub use tier_subscriptions::SubscriptionStatus;

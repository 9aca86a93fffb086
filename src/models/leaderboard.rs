use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Timeframe {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[default]
    #[serde(rename = "allTime")]
    AllTime,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub fan_name: String,
    pub total_amount: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_names() {
        let q: LeaderboardQuery = serde_json::from_str(r#"{"timeframe":"allTime"}"#).unwrap();
        assert_eq!(q.timeframe, Timeframe::AllTime);
        let q: LeaderboardQuery = serde_json::from_str(r#"{"timeframe":"week"}"#).unwrap();
        assert_eq!(q.timeframe, Timeframe::Week);
        let q: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.timeframe, Timeframe::AllTime);
        assert!(serde_json::from_str::<LeaderboardQuery>(r#"{"timeframe":"year"}"#).is_err());
    }
}

use anyhow::Context;
use battlenet_api::client::{ApiResult, BattlenetApi};
use battlenet_api::discord::DiscordWebhook;
use battlenet_api::{find_players, format_message};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// The tracked rifts of one invocation, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPayload {
    /// Category (e.g. `barbarian`, `team-4`) → battle tags to look up.
    pub rifts: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
struct RawPayload {
    rifts: serde_json::Map<String, serde_json::Value>,
}

impl JobPayload {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let raw: RawPayload = serde_json::from_str(raw).context("invalid job payload")?;
        let rifts = raw
            .rifts
            .into_iter()
            .map(|(category, tags)| {
                let tags: Vec<String> = serde_json::from_value(tags).with_context(|| {
                    format!("rift {category:?} must map to a list of battle tags")
                })?;
                Ok((category, tags))
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(Self { rifts })
    }
}

/// Read the payload from `path`, or stdin when there is none or it is `-`.
pub fn read_payload(path: Option<&Path>) -> anyhow::Result<JobPayload> {
    let content = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("could not read payload {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("could not read payload from stdin")?;
            buf
        }
    };
    JobPayload::from_json(&content)
}

/// Fetch every rift in turn and assemble the message. The first failure ends
/// the run; nothing partial is returned.
pub async fn build_summary(
    api: &BattlenetApi,
    season: u32,
    payload: &JobPayload,
    now: DateTime<Utc>,
) -> ApiResult<String> {
    let mut summary = format!(
        "Leaderboard stats from {}",
        now.format("%a, %d %b %Y %H:%M:%S GMT")
    );

    for (category, tags) in &payload.rifts {
        debug!("fetching rift-{category} for {} tag(s)", tags.len());
        let leaderboard = api.fetch_leaderboard(season, category).await?;
        let standings = find_players(&leaderboard.row, tags.as_slice())?;

        let found = standings.iter().filter(|(_, s)| s.is_found()).count();
        info!(
            "rift-{category}: {found}/{} tracked player(s) on a {}-row leaderboard",
            standings.len(),
            leaderboard.row.len()
        );

        summary.push_str("\n\n");
        summary.push_str(&format_message(&format!("rift-{category}"), &standings));
    }

    Ok(summary)
}

pub async fn track_leaderboard(
    api: &BattlenetApi,
    webhook: &DiscordWebhook,
    season: u32,
    payload: &JobPayload,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let summary = build_summary(api, season, payload, now).await?;
    webhook.send_message(&summary).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battlenet_api::auth::{ClientCredentials, TOKEN_PATH};
    use battlenet_api::client::ApiError;
    use chrono::TimeZone;
    use mockito::Matcher;

    fn board(rows: &[(&str, u32)]) -> String {
        let rows: Vec<_> = rows
            .iter()
            .map(|(tag, rank)| {
                serde_json::json!({
                    "player": [{ "data": [{ "id": "HeroBattleTag", "string": tag }] }],
                    "data": [{ "id": "Rank", "number": rank }],
                })
            })
            .collect();
        serde_json::json!({ "row": rows }).to_string()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 2, 20, 10, 0, 0).unwrap()
    }

    async fn mock_token(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_body(r#"{"access_token":"tok"}"#)
            .expect(1)
            .create_async()
            .await
    }

    fn api(server: &mockito::Server) -> BattlenetApi {
        BattlenetApi::with_hosts(ClientCredentials::new("id", "secret"), server.url(), server.url())
            .unwrap()
    }

    #[test]
    fn payload_keeps_category_order() {
        let payload = JobPayload::from_json(
            r#"{"rifts": {"team-4": ["A#1"], "barbarian": ["B#2", "C#3"], "1": []}}"#,
        )
        .unwrap();
        let categories: Vec<&str> = payload.rifts.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(categories, vec!["team-4", "barbarian", "1"]);
        assert_eq!(payload.rifts[1].1, vec!["B#2", "C#3"]);
    }

    #[test]
    fn payload_without_rifts_is_rejected() {
        assert!(JobPayload::from_json(r#"{"rift": {}}"#).is_err());
    }

    #[test]
    fn payload_with_non_list_tags_is_rejected() {
        let err = JobPayload::from_json(r#"{"rifts": {"wizard": "A#1"}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("wizard"));
    }

    #[test]
    fn missing_payload_file_is_an_error() {
        assert!(read_payload(Some(Path::new("/nonexistent/payload.json"))).is_err());
    }

    #[tokio::test]
    async fn summary_has_one_block_per_rift() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server).await;
        let _barb = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-barbarian")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(board(&[("Anon#1", 5), ("Anon#2", 6)]))
            .create_async()
            .await;
        let _team = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-team-2")
            .with_status(200)
            .with_body(board(&[("Anon#3", 1)]))
            .create_async()
            .await;

        let payload = JobPayload {
            rifts: vec![
                ("barbarian".into(), vec!["Anon#2".into(), "Ghost#9".into()]),
                ("team-2".into(), vec!["Anon#3".into()]),
            ],
        };
        let summary = build_summary(&api(&server), 16, &payload, fixed_now()).await.unwrap();

        token.assert_async().await;
        assert_eq!(
            summary,
            "Leaderboard stats from Wed, 20 Feb 2019 10:00:00 GMT\n\n\
             Leaderboard for rift-barbarian:\n\
             * Anon#2 at rank 6\n\
             * Ghost#9 not in list\n\n\
             Leaderboard for rift-team-2:\n\
             * Anon#3 at rank 1"
        );
    }

    #[tokio::test]
    async fn summary_is_posted_once() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server).await;
        let _board = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-1")
            .with_status(200)
            .with_body(board(&[("Anon#1", 5)]))
            .create_async()
            .await;
        let hook = server
            .mock("POST", "/webhook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "username": "bot",
                "content": "Leaderboard stats from Wed, 20 Feb 2019 10:00:00 GMT\n\n\
                            Leaderboard for rift-1:\n* Anon#1 at rank 5",
            })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let webhook = DiscordWebhook::new("bot", &format!("{}/webhook", server.url())).unwrap();
        let payload = JobPayload { rifts: vec![("1".into(), vec!["Anon#1".into()])] };
        track_leaderboard(&api(&server), &webhook, 16, &payload, fixed_now())
            .await
            .unwrap();

        hook.assert_async().await;
    }

    #[tokio::test]
    async fn failed_rift_aborts_before_the_webhook() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server).await;
        let _ok = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-1")
            .with_status(200)
            .with_body(board(&[("Anon#1", 5)]))
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-2")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;
        let never = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-3")
            .expect(0)
            .create_async()
            .await;
        let hook = server.mock("POST", "/webhook").expect(0).create_async().await;

        let webhook = DiscordWebhook::new("bot", &format!("{}/webhook", server.url())).unwrap();
        let payload = JobPayload {
            rifts: vec![
                ("1".into(), vec!["Anon#1".into()]),
                ("2".into(), vec!["Anon#1".into()]),
                ("3".into(), vec!["Anon#1".into()]),
            ],
        };
        let err = track_leaderboard(&api(&server), &webhook, 16, &payload, fixed_now())
            .await
            .unwrap_err();

        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Api { status, body, .. }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected leaderboard API error, got {other:?}"),
        }
        never.assert_async().await;
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_delivery_fails_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server).await;
        let _board = server
            .mock("GET", "/data/d3/season/16/leaderboard/rift-1")
            .with_status(200)
            .with_body(board(&[]))
            .create_async()
            .await;
        let _hook = server
            .mock("POST", "/webhook")
            .with_status(404)
            .with_body(r#"{"message": "Unknown Webhook"}"#)
            .create_async()
            .await;

        let webhook = DiscordWebhook::new("bot", &format!("{}/webhook", server.url())).unwrap();
        let payload = JobPayload { rifts: vec![("1".into(), vec!["Anon#1".into()])] };
        let err = track_leaderboard(&api(&server), &webhook, 16, &payload, fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Delivery { .. })));
    }
}

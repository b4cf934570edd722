//! End-to-end search tests against mock Invidious instances
//!
//! Uses wiremock to stand in for instances, so no test touches the network.

use serde_json::json;
use std::time::{Duration, Instant};
use skill_common::config::{InstanceManagement, SkillSettings, WatchUrlStyle};
use skill_common::{MediaItem, MediaType, PlaybackType};
use skill_invidious::{InvidiousSkill, SkillProfile};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// Settings using only the given instances, discovery off
fn settings_for(instances: &[String]) -> SkillSettings {
    SkillSettings {
        instances: instances.to_vec(),
        instance_management: InstanceManagement {
            discovery_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn mount_stats(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "version": "2.0" })))
        .mount(server)
        .await;
}

fn video(id: &str, title: &str, author: &str, length: u64) -> serde_json::Value {
    json!({
        "type": "video",
        "title": title,
        "videoId": id,
        "author": author,
        "authorId": "UCzz",
        "lengthSeconds": length,
        "viewCount": 1234,
        "published": 1_500_000_000,
        "videoThumbnails": [{ "quality": "maxres", "url": format!("/vi/{}/maxres.jpg", id) }]
    })
}

fn entries(items: &[MediaItem]) -> Vec<&skill_common::MediaEntry> {
    items
        .iter()
        .filter_map(|item| match item {
            MediaItem::Entry(e) => Some(e),
            MediaItem::Playlist(_) => None,
        })
        .collect()
}

// ============================================================================
// Ranking
// ============================================================================

#[tokio::test]
async fn test_zz_top_ranking() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "zz top"))
        .and(query_param("type", "video"))
        .and(query_param("sort_by", "relevance"))
        .and(query_param("region", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("v0", "ZZ Top - Gimme All Your Lovin'", "ZZ Top", 240),
            video("v1", "ZZ Top Greatest Hits", "ZZ Top Fans", 3600),
            video("v2", "Unrelated Video", "Random Uploader", 60),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[server.uri()])).unwrap();
    let items = skill.search("zz top", MediaType::Music).await;

    let entries = entries(&items);
    assert_eq!(entries.len(), 3);
    let scores: Vec<u8> = entries.iter().map(|e| e.match_confidence).collect();
    assert!(scores[0] > scores[2], "{:?}", scores);
    assert!(scores[1] > scores[2], "{:?}", scores);

    let first = entries[0];
    assert_eq!(first.uri, "https://www.youtube.com/watch?v=v0");
    assert_eq!(first.playback, PlaybackType::Audio);
    assert_eq!(first.length_ms, 240_000);
    assert_eq!(first.image, format!("{}/vi/v0/maxres.jpg", server.uri()));
    assert_eq!(first.skill_id, "t.fake");
}

#[tokio::test]
async fn test_explicit_mention_adds_bonus() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;

    // The service name never reaches the instance
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "zz top on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("v9", "Unrelated Video", "Somebody", 100),
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[server.uri()])).unwrap();

    let plain = skill.search("zz top on", MediaType::Music).await;
    let explicit = skill.search("zz top on invidious", MediaType::Music).await;

    let plain_score = u32::from(plain[0].match_confidence());
    let explicit_score = u32::from(explicit[0].match_confidence());
    assert!(plain_score <= 50, "plain score {} leaves no room", plain_score);
    assert_eq!(explicit_score, plain_score + 50);
}

// ============================================================================
// Instance selection
// ============================================================================

#[tokio::test]
async fn test_all_instances_dead_uses_first() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_stats(&first, 503).await;
    mount_stats(&second, 503).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("a1", "From first", "First", 10),
        ])))
        .mount(&first)
        .await;

    let mut skill = InvidiousSkill::new(
        "t.fake",
        SkillProfile::Video,
        settings_for(&[first.uri(), second.uri()]),
    )
    .unwrap();

    assert_eq!(skill.current_instance().await, Some(first.uri()));

    let items = skill.search("anything", MediaType::Video).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title(), "From first");
}

#[tokio::test]
async fn test_unreachable_pool_degrades_to_no_results() {
    let mut skill = InvidiousSkill::new(
        "t.fake",
        SkillProfile::Video,
        settings_for(&["http://127.0.0.1:9".to_string()]),
    )
    .unwrap();

    assert_eq!(
        skill.current_instance().await.as_deref(),
        Some("http://127.0.0.1:9")
    );
    assert!(skill.search("zz top", MediaType::Music).await.is_empty());
}

#[tokio::test]
async fn test_dead_first_instance_rotates_to_live_one() {
    let dead = MockServer::start().await;
    let live = MockServer::start().await;
    mount_stats(&dead, 500).await;
    mount_stats(&live, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("b1", "From live", "Live", 10),
        ])))
        .mount(&live)
        .await;

    let mut skill = InvidiousSkill::new(
        "t.fake",
        SkillProfile::Video,
        settings_for(&[dead.uri(), live.uri()]),
    )
    .unwrap();

    let items = skill.search("anything", MediaType::Video).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title(), "From live");
    assert_eq!(skill.pool().unwrap().cursor(), 1);
}

#[tokio::test]
async fn test_slow_instance_times_out_to_next() {
    let slow = MockServer::start().await;
    let live = MockServer::start().await;

    // Answers, but only after the liveness timeout
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(8)))
        .mount(&slow)
        .await;
    mount_stats(&live, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("s1", "From live", "Live", 10),
        ])))
        .mount(&live)
        .await;

    let mut skill = InvidiousSkill::new(
        "t.fake",
        SkillProfile::Video,
        settings_for(&[slow.uri(), live.uri()]),
    )
    .unwrap();

    let started = Instant::now();
    let items = skill.search("anything", MediaType::Video).await;
    let elapsed = started.elapsed();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title(), "From live");
    assert_eq!(skill.pool().unwrap().cursor(), 1);
    assert!(elapsed >= Duration::from_secs(4), "gave up too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(8), "waited for the slow instance: {:?}", elapsed);
}

#[tokio::test]
async fn test_empty_pool_yields_nothing() {
    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[])).unwrap();
    assert!(skill.search("zz top", MediaType::Music).await.is_empty());
}

// ============================================================================
// Failure tolerance
// ============================================================================

#[tokio::test]
async fn test_search_error_status_is_empty() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[server.uri()])).unwrap();
    assert!(skill.search("zz top", MediaType::Music).await.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_empty() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[server.uri()])).unwrap();
    assert!(skill.search("zz top", MediaType::Music).await.is_empty());
}

#[tokio::test]
async fn test_missing_fields_defaulted() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "video", "videoId": "bare" }
        ])))
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Video, settings_for(&[server.uri()])).unwrap();
    let items = skill.search("zz top", MediaType::Video).await;

    let entries = entries(&items);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].uri, "https://www.youtube.com/watch?v=bare");
    assert_eq!(entries[0].title, "");
    assert_eq!(entries[0].artist, "");
    assert_eq!(entries[0].image, "");
    assert_eq!(entries[0].length_ms, 0);
}

#[tokio::test]
async fn test_max_results_caps_records() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    let records: Vec<serde_json::Value> = (0..10)
        .map(|i| video(&format!("id{}", i), "Title", "Author", 10))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(&server)
        .await;

    let mut settings = settings_for(&[server.uri()]);
    settings.search.max_results = 4;
    let mut skill = InvidiousSkill::new("t.fake", SkillProfile::Video, settings).unwrap();

    assert_eq!(skill.search("title", MediaType::Video).await.len(), 4);
}

#[tokio::test]
async fn test_instance_watch_url_style() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("w1", "Title", "Author", 10)
        ])))
        .mount(&server)
        .await;

    let mut settings = settings_for(&[server.uri()]);
    settings.watch_url_style = WatchUrlStyle::Instance;
    let mut skill = InvidiousSkill::new("t.fake", SkillProfile::Video, settings).unwrap();

    let items = skill.search("title", MediaType::Video).await;
    assert_eq!(entries(&items)[0].uri, format!("{}/watch?v=w1", server.uri()));
}

// ============================================================================
// Channel playlists (music variant)
// ============================================================================

#[tokio::test]
async fn test_music_variant_expands_channels() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("type", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "type": "channel",
                "author": "ZZ Top",
                "authorId": "UCzz",
                "authorThumbnails": [{ "url": "//yt3.example.com/zz.jpg", "width": 176 }]
            },
            video("v1", "ZZ Top - La Grange (Official Audio)", "ZZ Top", 231),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/channels/UCzz/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "videos": [
                video("c1", "Tush", "ZZ Top", 140),
                video("c2", "Sponsored: new merch drop", "ZZ Top", 30),
                video("c3", "Legs", "ZZ Top", 270),
            ],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut skill =
        InvidiousSkill::new("t.fake", SkillProfile::Music, settings_for(&[server.uri()])).unwrap();
    let items = skill.search("zz top", MediaType::Music).await;

    assert_eq!(items.len(), 2);
    let MediaItem::Playlist(playlist) = &items[0] else {
        panic!("expected playlist first, got {:?}", items[0]);
    };
    assert_eq!(playlist.title, "ZZ Top");
    // Protocol-relative avatars follow the instance scheme
    assert_eq!(playlist.image, "http://yt3.example.com/zz.jpg");
    assert_eq!(playlist.playback, PlaybackType::Audio);
    let titles: Vec<&str> = playlist.entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Tush", "Legs"]);
    assert!(playlist.match_confidence <= 100);

    assert!(matches!(items[1], MediaItem::Entry(_)));
}

#[tokio::test]
async fn test_video_variant_skips_channels() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "channel", "author": "ZZ Top", "authorId": "UCzz" },
            video("v1", "La Grange", "ZZ Top", 231),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/UCzz/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = settings_for(&[server.uri()]);
    settings.search.default_type = Some("all".to_string());
    let mut skill = InvidiousSkill::new("t.fake", SkillProfile::Video, settings).unwrap();

    let items = skill.search("zz top", MediaType::Video).await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], MediaItem::Entry(_)));
}

#[tokio::test]
async fn test_fallback_mode_lowers_scores() {
    let server = MockServer::start().await;
    mount_stats(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            video("v1", "Unrelated Video", "Somebody", 100),
        ])))
        .mount(&server)
        .await;

    let mut normal =
        InvidiousSkill::new("t.fake", SkillProfile::Music, settings_for(&[server.uri()])).unwrap();
    let mut settings = settings_for(&[server.uri()]);
    settings.fallback_mode = true;
    let mut fallback = InvidiousSkill::new("t.fake", SkillProfile::Music, settings).unwrap();

    let a = normal.search("unrelated video", MediaType::Music).await;
    let b = fallback.search("unrelated video", MediaType::Music).await;
    assert!(b[0].match_confidence() < a[0].match_confidence());

    // Naming the service lifts the penalty
    let c = fallback.search("unrelated video invidious", MediaType::Music).await;
    assert!(c[0].match_confidence() > b[0].match_confidence());
}

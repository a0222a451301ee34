//! End-to-end pipeline runs against a mock Gemini server.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use mockito::{Matcher, Server, ServerGuard};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use onereel_core::{
    DescriptionServiceConfig, ErrorMetadata, GatherPolicy, IngestionConfig, MediaKind, MediaRef,
    PipelineConfig,
};
use onereel_plugins::GeminiVisionClient;
use onereel_processing::{FrameExtractor, IngestError, MediaIngestor};
use onereel_services::{
    filter_gallery, DescriptionAggregator, GalleryStore, MediaPipeline, MediaSource, PickOutcome,
    PickedMedia, PipelineError, SearchQuery,
};

const ENDPOINT: &str = "/models/gemini-1.5-flash:generateContent";

fn create_test_image(shade: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(24, 24, Rgb([shade, 255 - shade, 128]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Stands in for ffmpeg: every requested timestamp yields a small PNG.
struct FakeFrames;

#[async_trait]
impl FrameExtractor for FakeFrames {
    async fn extract_frame(&self, _video: &Path, timestamp_ms: u64) -> Result<Bytes, IngestError> {
        Ok(Bytes::from(create_test_image((timestamp_ms / 1000) as u8)))
    }
}

struct PickFile(PickedMedia);

#[async_trait]
impl MediaSource for PickFile {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn pick(&self) -> Option<PickedMedia> {
        Some(self.0.clone())
    }
}

fn gemini_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn build_pipeline(server: &ServerGuard, gallery: GalleryStore) -> MediaPipeline {
    let client = GeminiVisionClient::new(&DescriptionServiceConfig {
        api_key: "integration-key".to_string(),
        api_base: server.url(),
        model: "gemini-1.5-flash".to_string(),
        timeout_secs: None,
    })
    .unwrap();

    MediaPipeline::new(
        MediaIngestor::new(&IngestionConfig::default(), Arc::new(FakeFrames)),
        DescriptionAggregator::new(Arc::new(client), GatherPolicy::FailFast),
        gallery,
        PipelineConfig::default(),
    )
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> MediaRef {
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    MediaRef::new(path)
}

#[tokio::test]
async fn image_then_video_fill_slots_and_search() {
    let mut server = Server::new_async().await;
    let image_mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::UrlEncoded("key".into(), "integration-key".into()))
        .match_body(Matcher::Regex("Describe this image for AI search filtering".into()))
        .with_status(200)
        .with_body(gemini_reply("A Cat on a mat"))
        .expect(1)
        .create_async()
        .await;
    let video_mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::UrlEncoded("key".into(), "integration-key".into()))
        .match_body(Matcher::Regex("Summarize this frame for video search".into()))
        .with_status(200)
        .with_body(gemini_reply("waves"))
        .expect(5)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = build_pipeline(&server, GalleryStore::new());

    let photo = PickFile(PickedMedia {
        media_ref: write_file(&dir, "cat.png", &create_test_image(10)),
        kind: MediaKind::Image,
    });
    let clip = PickFile(PickedMedia {
        media_ref: write_file(&dir, "beach.mp4", b"container bytes"),
        kind: MediaKind::Video,
    });

    let (photo_outcome, clip_outcome) = tokio::join!(
        pipeline.pick_into_slot(0, &photo),
        pipeline.pick_into_slot(1, &clip)
    );
    assert!(matches!(photo_outcome.unwrap(), PickOutcome::Stored(_)));
    let PickOutcome::Stored(video) = clip_outcome.unwrap() else {
        panic!("video pick should be stored");
    };
    assert_eq!(video.description(), "waves waves waves waves waves");
    assert!(video.preview_ref().is_thumbnail());

    let snapshot = pipeline.gallery().snapshot().await;
    let hits = filter_gallery(&snapshot, &SearchQuery::new("cat"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, 0);
    assert_eq!(filter_gallery(&snapshot, &SearchQuery::new("")).len(), 2);
    assert!(filter_gallery(&snapshot, &SearchQuery::new("dog")).is_empty());

    image_mock.assert_async().await;
    video_mock.assert_async().await;
}

#[tokio::test]
async fn failed_frame_description_leaves_slot_unchanged() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Describe this image".into()))
        .with_status(200)
        .with_body(gemini_reply("a red car"))
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Summarize this frame".into()))
        .with_status(500)
        .with_body(r#"{"error":{"message":"backend unavailable"}}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = build_pipeline(&server, GalleryStore::new());

    pipeline
        .process_into_slot(2, write_file(&dir, "car.png", &create_test_image(80)), MediaKind::Image)
        .await
        .unwrap();
    let before = pipeline.gallery().get(2).await.unwrap().unwrap();

    let err = pipeline
        .process_into_slot(2, write_file(&dir, "clip.mov", b"video"), MediaKind::Video)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Description { .. }));
    assert_eq!(err.alert_title(), "Error");
    assert_eq!(err.client_message(), "Failed to process video frames.");

    let after = pipeline.gallery().get(2).await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.description(), "a red car");
}

#[tokio::test]
async fn replacing_a_slot_swaps_the_whole_entry() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Describe this image".into()))
        .with_status(200)
        .with_body(gemini_reply("a red car"))
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Summarize this frame".into()))
        .with_status(200)
        .with_body(gemini_reply("a blue boat"))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = build_pipeline(&server, GalleryStore::new());
    let car = write_file(&dir, "car.png", &create_test_image(80));
    let boat = write_file(&dir, "boat.mp4", b"video");

    pipeline
        .process_into_slot(2, car.clone(), MediaKind::Image)
        .await
        .unwrap();
    let old_snapshot = pipeline.gallery().snapshot().await;

    pipeline
        .process_into_slot(2, boat.clone(), MediaKind::Video)
        .await
        .unwrap();
    let current = pipeline.gallery().get(2).await.unwrap().unwrap();

    assert_eq!(current.source_ref(), &boat);
    assert_eq!(current.kind(), MediaKind::Video);
    assert!(current.preview_ref().is_thumbnail());
    assert!(current.description().starts_with("a blue boat"));

    let old = old_snapshot.get(2).unwrap();
    assert_eq!(old.source_ref(), &car);
    assert_eq!(old.description(), "a red car");
    assert_ne!(old.id(), current.id());
}

#[tokio::test]
async fn empty_gemini_reply_falls_back() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = build_pipeline(&server, GalleryStore::new());

    let outcome = pipeline
        .process_into_slot(0, write_file(&dir, "blank.png", &create_test_image(0)), MediaKind::Image)
        .await
        .unwrap();

    let PickOutcome::Stored(item) = outcome else {
        panic!("expected Stored");
    };
    assert_eq!(item.description(), "No response from Gemini.");
}

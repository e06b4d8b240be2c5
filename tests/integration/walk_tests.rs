//! Walker tests against the in-memory fetcher

use crate::common::{entries, read_json, FakeFetch, RecordingSink, COLLECTION_URL};
use serde_json::json;
use std::time::Duration;
use talent_harvest::crawler::{GraphWalker, WalkOptions};
use talent_harvest::mirror::Mirror;
use talent_harvest::output::{HarvestEvent, SkipReason};
use talent_harvest::HarvestError;
use tempfile::TempDir;

async fn walk(fetch: &FakeFetch, mirror: &Mirror, sink: &RecordingSink) -> usize {
    walk_with(fetch, mirror, sink, WalkOptions::default()).await
}

async fn walk_with(
    fetch: &FakeFetch,
    mirror: &Mirror,
    sink: &RecordingSink,
    options: WalkOptions,
) -> usize {
    GraphWalker::new(fetch, mirror, sink, options)
        .run(COLLECTION_URL)
        .await
        .expect("walk should succeed")
}

#[tokio::test]
async fn test_candidate_leaf_is_mirrored_under_relation_dir() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let application = json!({
        "id": "A1",
        "links": [{"rel": "Candidate", "href": "https://x/cand/1"}]
    });
    let fetch = FakeFetch::new()
        .with_collection(json!([application.clone()]))
        .with_document("https://x/cand/1", json!({"id": "C1", "links": []}));

    let total = walk(&fetch, &mirror, &sink).await;

    assert_eq!(total, 1);
    assert_eq!(entries(out.path()), vec!["A1"]);
    assert_eq!(read_json(&out.path().join("A1/application.json")), application);
    assert_eq!(entries(&out.path().join("A1")), vec!["Candidate", "application.json"]);
    assert_eq!(entries(&out.path().join("A1/Candidate")), vec!["C1.json"]);
    assert_eq!(
        read_json(&out.path().join("A1/Candidate/C1.json")),
        json!({"id": "C1", "links": []})
    );
    assert_eq!(fetch.requested(), vec![COLLECTION_URL, "https://x/cand/1"]);
}

#[tokio::test]
async fn test_attachment_is_downloaded_over_https() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "Resume", "href": "http://x/resume/1"}]
        }]))
        .with_document(
            "https://x/resume/1",
            json!({
                "document_type": "Resume",
                "file_name": "r.pdf",
                "links": [
                    {"rel": "Download", "href": "http://x/f/1"},
                    {"rel": "Owner", "href": "https://x/owner/1"}
                ]
            }),
        )
        .with_document("https://x/owner/1", json!({"id": "O1"}))
        .with_payload("https://x/f/1", b"%PDF-1.4 resume");

    walk(&fetch, &mirror, &sink).await;

    let resume_dir = out.path().join("A1/Resume");
    assert_eq!(std::fs::read(resume_dir.join("r.pdf")).unwrap(), b"%PDF-1.4 resume");
    assert_eq!(entries(&resume_dir), vec!["r.pdf", "resource.json"]);

    // Scheme upgraded, and nothing else linked from the descriptor is followed
    assert_eq!(
        fetch.requested(),
        vec![COLLECTION_URL, "https://x/resume/1", "https://x/f/1"]
    );
    assert_eq!(fetch.request_count("https://x/owner/1"), 0);

    let downloaded: Vec<HarvestEvent> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, HarvestEvent::AttachmentDownloaded { .. }))
        .collect();
    assert_eq!(downloaded.len(), 1);
    if let HarvestEvent::AttachmentDownloaded {
        bytes, rel, sha256, ..
    } = &downloaded[0]
    {
        assert_eq!(*bytes, 15);
        assert_eq!(rel, "Resume");
        assert_eq!(sha256.len(), 64);
    }
}

#[tokio::test]
async fn test_one_directory_per_application() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let applications = json!([
        {"id": "A1", "status": "new"},
        {"id": "A2", "status": "hired", "links": []},
        {"id": 3, "status": "rejected"}
    ]);
    let fetch = FakeFetch::new().with_collection(applications.clone());

    let total = walk(&fetch, &mirror, &sink).await;

    assert_eq!(total, 3);
    assert_eq!(entries(out.path()), vec!["3", "A1", "A2"]);
    for (dir, expected) in ["A1", "A2", "3"].iter().zip(applications.as_array().unwrap()) {
        assert_eq!(&read_json(&out.path().join(dir).join("application.json")), expected);
    }
}

#[tokio::test]
async fn test_application_without_id_is_skipped() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new().with_collection(json!([{"status": "new"}, {"id": "A2"}]));

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(entries(out.path()), vec!["A2"]);
    assert!(sink.events().contains(&HarvestEvent::ApplicationSkipped {
        index: 0,
        reason: "missing id".to_string(),
    }));
}

#[tokio::test]
async fn test_links_are_visited_depth_first_in_source_order() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [
                {"rel": "Candidate", "href": "https://x/cand/1"},
                {"rel": "Skills", "href": "https://x/skills"},
                {"rel": "Education", "href": "https://x/edu/1"}
            ]
        }]))
        .with_document(
            "https://x/cand/1",
            json!({
                "id": "C1",
                "links": [
                    {"rel": "Licenses", "href": "https://x/lic"},
                    {"rel": "Motivations", "href": "https://x/mot"}
                ]
            }),
        )
        .with_document("https://x/skills", json!([{"id": "S1"}]))
        .with_document("https://x/edu/1", json!({"id": "E1"}))
        .with_document("https://x/lic", json!([]))
        .with_document("https://x/mot", json!([]));

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(
        fetch.requested(),
        vec![
            COLLECTION_URL,
            "https://x/cand/1",
            "https://x/lic",
            "https://x/mot",
            "https://x/skills",
            "https://x/edu/1",
        ]
    );
    assert!(out.path().join("A1/Candidate/C1.json").exists());
    assert!(out.path().join("A1/Skills/S1.json").exists());
    assert!(out.path().join("A1/Education/E1.json").exists());
}

#[tokio::test]
async fn test_array_response_expands_to_one_snapshot_per_object() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "WorkExperiences", "href": "https://x/work"}]
        }]))
        .with_document(
            "https://x/work",
            json!([{"id": "W1", "title": "Engineer"}, {"title": "Intern"}, 42]),
        );

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(
        entries(&out.path().join("A1/WorkExperiences")),
        vec!["W1.json", "resource-1.json"]
    );
    assert_eq!(
        sink.count(|e| matches!(e, HarvestEvent::NodePersisted { .. })),
        2
    );
}

#[tokio::test]
async fn test_failed_sibling_does_not_stop_the_walk() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([
            {
                "id": "A1",
                "links": [
                    {"rel": "Candidate", "href": "https://x/missing"},
                    {"rel": "Referral", "href": "https://x/ref/1"}
                ]
            },
            {"id": "A2"}
        ]))
        .with_document("https://x/ref/1", json!({"id": "R1"}));

    let total = walk(&fetch, &mirror, &sink).await;

    assert_eq!(total, 2);
    assert!(!out.path().join("A1/Candidate").exists());
    assert!(out.path().join("A1/Referral/R1.json").exists());
    assert!(out.path().join("A2/application.json").exists());
    assert!(sink.events().contains(&HarvestEvent::LinkPruned {
        application: "A1".to_string(),
        rel: "Candidate".to_string(),
        href: "https://x/missing".to_string(),
        status: Some(404),
        reason: "HTTP 404".to_string(),
    }));
}

#[tokio::test]
async fn test_cycles_are_followed_once() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "Candidate", "href": "https://x/cand/1"}]
        }]))
        .with_document(
            "https://x/cand/1",
            json!({
                "id": "C1",
                "links": [{"rel": "Candidate", "href": "http://x/cand/1"}]
            }),
        );

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(fetch.request_count("https://x/cand/1"), 1);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            HarvestEvent::LinkSkipped {
                reason: SkipReason::AlreadyVisited,
                ..
            }
        )),
        1
    );
}

#[tokio::test]
async fn test_visited_set_is_per_application() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let shared = json!([{"rel": "Job", "href": "https://x/job/1"}]);
    let fetch = FakeFetch::new()
        .with_collection(json!([
            {"id": "A1", "links": shared.clone()},
            {"id": "A2", "links": shared}
        ]))
        .with_document("https://x/job/1", json!({"id": "J1"}));

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(fetch.request_count("https://x/job/1"), 2);
    assert!(out.path().join("A1/Job/J1.json").exists());
    assert!(out.path().join("A2/Job/J1.json").exists());
}

#[tokio::test]
async fn test_attachment_without_download_link_is_reported() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "CoverLetter", "href": "https://x/doc/1"}]
        }]))
        .with_document(
            "https://x/doc/1",
            json!({
                "id": "D1",
                "document_type": "CoverLetter",
                "file_name": "letter.docx",
                "links": [{"rel": "Self", "href": "https://x/doc/1"}]
            }),
        );

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(entries(&out.path().join("A1/CoverLetter")), vec!["D1.json"]);
    assert_eq!(fetch.requested().len(), 2);
    assert!(sink.events().contains(&HarvestEvent::AttachmentSkipped {
        application: "A1".to_string(),
        file_name: "letter.docx".to_string(),
    }));
}

#[tokio::test]
async fn test_failed_download_leaves_no_file() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [
                {"rel": "Resume", "href": "https://x/resume/1"},
                {"rel": "Candidate", "href": "https://x/cand/1"}
            ]
        }]))
        .with_document(
            "https://x/resume/1",
            json!({
                "document_type": "Resume",
                "file_name": "r.pdf",
                "links": [{"rel": "Download", "href": "https://x/gone"}]
            }),
        )
        .with_document("https://x/cand/1", json!({"id": "C1"}));

    walk(&fetch, &mirror, &sink).await;

    assert_eq!(entries(&out.path().join("A1/Resume")), vec!["resource.json"]);
    assert!(out.path().join("A1/Candidate/C1.json").exists());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            HarvestEvent::DownloadFailed { rel, descriptor_rel, href, .. }
                if rel == "Download" && descriptor_rel == "Resume" && href == "https://x/gone"
        )),
        1
    );
}

#[tokio::test]
async fn test_links_without_href_or_beyond_depth_are_skipped() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [
                {"rel": "Empty", "href": ""},
                {"rel": "Candidate", "href": "https://x/cand/1"}
            ]
        }]))
        .with_document(
            "https://x/cand/1",
            json!({"id": "C1", "links": [{"rel": "Deeper", "href": "https://x/deeper"}]}),
        );
    let options = WalkOptions {
        max_depth: 1,
        ..WalkOptions::default()
    };

    walk_with(&fetch, &mirror, &sink, options).await;

    assert_eq!(fetch.request_count("https://x/deeper"), 0);
    assert!(out.path().join("A1/Candidate/C1.json").exists());

    let reasons: Vec<SkipReason> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            HarvestEvent::LinkSkipped { reason, .. } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![SkipReason::MissingHref, SkipReason::DepthExceeded(2)]
    );
}

#[tokio::test]
async fn test_shape_mismatch_is_advisory() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "Candidate", "href": "https://x/cand/1"}]
        }]))
        .with_document("https://x/cand/1", json!({"id": "C1", "name": "not an object"}));

    walk(&fetch, &mirror, &sink).await;

    assert!(out.path().join("A1/Candidate/C1.json").exists());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            HarvestEvent::ShapeMismatch { entity, .. } if entity == "candidate"
        )),
        1
    );
}

#[tokio::test]
async fn test_branch_budget_stops_a_stalled_application() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([
            {"id": "A1", "links": [{"rel": "Candidate", "href": "https://x/slow"}]},
            {"id": "A2"}
        ]))
        .with_document("https://x/slow", json!({"id": "C1"}))
        .with_delay(Duration::from_secs(10));
    let options = WalkOptions {
        branch_timeout: Duration::from_millis(100),
        ..WalkOptions::default()
    };

    walk_with(&fetch, &mirror, &sink, options).await;

    assert!(out.path().join("A1/application.json").exists());
    assert!(!out.path().join("A1/Candidate").exists());
    assert!(out.path().join("A2/application.json").exists());
    assert!(sink.events().contains(&HarvestEvent::BranchTimedOut {
        application: "A1".to_string(),
        budget: Duration::from_millis(100),
    }));
}

#[tokio::test]
async fn test_concurrent_applications_are_all_mirrored() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let mut fetch = FakeFetch::new();
    let mut applications = Vec::new();
    for i in 0..8 {
        let href = format!("https://x/cand/{}", i);
        applications.push(json!({
            "id": format!("A{}", i),
            "links": [{"rel": "Candidate", "href": href}]
        }));
        fetch = fetch.with_document(&href, json!({"id": format!("C{}", i)}));
    }
    let fetch = fetch.with_collection(json!(applications));
    let options = WalkOptions {
        max_concurrent_applications: 4,
        ..WalkOptions::default()
    };

    let total = walk_with(&fetch, &mirror, &sink, options).await;

    assert_eq!(total, 8);
    for i in 0..8 {
        assert!(out
            .path()
            .join(format!("A{}/Candidate/C{}.json", i, i))
            .exists());
    }
}

#[tokio::test]
async fn test_missing_root_collection_is_fatal() {
    let out = TempDir::new().unwrap();
    let apps_dir = out.path().join("apps");
    let mirror = Mirror::new(&apps_dir);
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new();

    let result = GraphWalker::new(&fetch, &mirror, &sink, WalkOptions::default())
        .run(COLLECTION_URL)
        .await;

    assert!(matches!(result, Err(HarvestError::RootFetch { status: Some(404), .. })));
    assert!(!apps_dir.exists());
}

#[tokio::test]
async fn test_root_collection_must_be_an_array() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new().with_collection(json!({"id": "A1"}));

    let result = GraphWalker::new(&fetch, &mirror, &sink, WalkOptions::default())
        .run(COLLECTION_URL)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, HarvestError::UnexpectedCollection { .. }));
    assert_eq!(err.kind(), "RootFetchFailure");
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_id_less_siblings_keep_separate_children() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "Educations", "href": "https://x/edu"}]
        }]))
        .with_document(
            "https://x/edu",
            json!([
                {"degree": "BSc", "links": [{"rel": "School", "href": "https://x/s/1"}]},
                {"degree": "MSc", "links": [{"rel": "School", "href": "https://x/s/2"}]}
            ]),
        )
        .with_document("https://x/s/1", json!({"name": "First"}))
        .with_document("https://x/s/2", json!({"name": "Second"}));

    walk(&fetch, &mirror, &sink).await;

    let school_dir = out.path().join("A1/Educations/School");
    assert_eq!(
        entries(&school_dir),
        vec!["resource-0.resource.json", "resource-1.resource.json"]
    );
    assert_eq!(
        read_json(&school_dir.join("resource-0.resource.json")),
        json!({"name": "First"})
    );
    assert_eq!(
        read_json(&school_dir.join("resource-1.resource.json")),
        json!({"name": "Second"})
    );
}

#[tokio::test]
async fn test_budget_expiring_mid_download_leaves_no_partial_file() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let fetch = FakeFetch::new()
        .with_collection(json!([{
            "id": "A1",
            "links": [{"rel": "Resume", "href": "https://x/resume/1"}]
        }]))
        .with_document(
            "https://x/resume/1",
            json!({
                "document_type": "Resume",
                "file_name": "r.pdf",
                "links": [{"rel": "Download", "href": "https://x/f/1"}]
            }),
        )
        .with_payload("https://x/f/1", b"%PDF-1.4 resume")
        .with_download_stall(Duration::from_secs(10));
    let options = WalkOptions {
        branch_timeout: Duration::from_millis(200),
        ..WalkOptions::default()
    };

    walk_with(&fetch, &mirror, &sink, options).await;

    assert_eq!(entries(&out.path().join("A1/Resume")), vec!["resource.json"]);
    assert_eq!(
        sink.count(|e| matches!(e, HarvestEvent::BranchTimedOut { .. })),
        1
    );
}

#[tokio::test]
async fn test_large_numbers_are_persisted_verbatim() {
    let out = TempDir::new().unwrap();
    let mirror = Mirror::new(out.path());
    let sink = RecordingSink::new();
    let collection = serde_json::from_str(
        r#"[{"id":"A1","external_ref":12345678901234567890123,"links":[{"rel":"Candidate","href":"https://x/cand/1"}]}]"#,
    )
    .unwrap();
    let candidate = serde_json::from_str(r#"{"id":"C1","score":0.12345678901234567890}"#).unwrap();
    let fetch = FakeFetch::new()
        .with_collection(collection)
        .with_document("https://x/cand/1", candidate);

    walk(&fetch, &mirror, &sink).await;

    let application = std::fs::read_to_string(out.path().join("A1/application.json")).unwrap();
    assert!(application.contains("\"external_ref\": 12345678901234567890123"));
    let snapshot = std::fs::read_to_string(out.path().join("A1/Candidate/C1.json")).unwrap();
    assert!(snapshot.contains("\"score\": 0.12345678901234567890"));
}

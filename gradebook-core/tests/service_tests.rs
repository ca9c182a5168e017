mod common;

use serde_json::json;

use common::{client, fail, fixture_backend, json_body, ok};
use gradebook_core::client::{FormPart, Payload, TransportError, TransportResponse};
use gradebook_core::services::{exam, file, score, student};
use gradebook_core::types::*;
use gradebook_core::GradebookError;

#[tokio::test]
async fn test_student_list_sends_only_set_filters() {
    let api = client(fixture_backend);
    let students = student::list(&api, &StudentFilters::by_semester("1141")).await.unwrap();
    assert_eq!(students.len(), 3);
    assert!(students.iter().all(|s| s.student_semester == "1141"));

    let calls = api.transport().calls();
    assert_eq!(calls[0].path, "/Student_MetadataWriter/read");
    assert_eq!(json_body(&calls[0]), &json!({ "student_semester": "1141" }));
}

#[tokio::test]
async fn test_student_get_not_found() {
    let api = client(fixture_backend);
    let err = student::get(&api, "no-such-uuid").await.unwrap_err();
    assert!(matches!(err, GradebookError::NotFound { .. }));
    assert_eq!(err.code(), 404);
    assert_eq!(err.to_string(), "Student not found");

    let found = student::get_by_number(&api, "B11001003").await.unwrap();
    assert_eq!(found.student_status, StudentStatus::Withdrawn);
}

#[tokio::test]
async fn test_student_list_accepts_null_data() {
    let api = client(|_| ok(serde_json::Value::Null));
    assert!(student::list(&api, &StudentFilters::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_student_create_and_delete() {
    let api = client(|req| match req.path.as_str() {
        "/Student_MetadataWriter/create" => {
            let mut created = json_body(req).clone();
            created["student_uuid"] = json!("5f0c1a2e-0100");
            created["student_status"] = json!("修業中");
            ok(created)
        }
        "/Student_MetadataWriter/delete" => Ok(TransportResponse::json(
            200,
            &json!({ "status": "success", "message": "Student deleted" }),
        )),
        other => panic!("unexpected call to {}", other),
    });

    let created = student::create(
        &api,
        &CreateStudentRequest {
            student_name: "張三".into(),
            student_number: "B11001010".into(),
            student_semester: "1141".into(),
            student_status: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.student_uuid, "5f0c1a2e-0100");

    student::delete(&api, &created.student_uuid).await.unwrap();
    let calls = api.transport().calls();
    assert_eq!(json_body(&calls[1]), &json!({ "student_uuid": "5f0c1a2e-0100" }));
}

#[tokio::test]
async fn test_student_status_stats() {
    let api = client(fixture_backend);
    let stats = student::status_stats(&api, "1141").await.unwrap();
    assert_eq!(stats.count(StudentStatus::InProgress), 2);
    assert_eq!(stats.count(StudentStatus::Withdrawn), 1);
    assert_eq!(stats.total(), 3);
}

#[tokio::test]
async fn test_student_upload_excel_multipart() {
    let api = client(|_| {
        ok(json!({
            "created_count": 2,
            "error_count": 1,
            "created_students": ["B11001010", "B11001011"],
            "errors": ["Row 4: invalid student number"]
        }))
    });
    let resp = student::upload_excel(&api, UploadedFile::new("roster.xlsx", b"PK".to_vec()))
        .await
        .unwrap();
    assert_eq!(resp.created_count, 2);
    assert_eq!(resp.errors.len(), 1);

    let calls = api.transport().calls();
    assert_eq!(calls[0].path, "/Student_MetadataWriter/upload_excel");
    assert_eq!(
        calls[0].payload,
        Payload::Multipart(vec![FormPart::File {
            name: "file".into(),
            file_name: "roster.xlsx".into(),
            content: b"PK".to_vec(),
        }])
    );
}

#[tokio::test]
async fn test_student_export_excel_errors() {
    let api = client(|_| Ok(TransportResponse::json(404, &json!({ "detail": "No students in semester 1999" }))));
    let err = student::export_excel(
        &api,
        &ExportStudentsExcelRequest {
            student_semester: "1999".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), 404);
    assert_eq!(err.to_string(), "No students in semester 1999");

    let api = client(|_| Ok(TransportResponse::bytes(500, "text/html", b"<h1>500</h1>".to_vec())));
    let err = student::export_excel(
        &api,
        &ExportStudentsExcelRequest {
            student_semester: "1141".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Failed to export Excel file");
}

#[tokio::test]
async fn test_score_get_variants() {
    let api = client(fixture_backend);
    let s = score::get(&api, "9a7e-0002").await.unwrap();
    assert_eq!(s.score_total.as_deref(), Some("86.15"));

    let err = score::get(&api, "9a7e-none").await.unwrap_err();
    assert_eq!(err.to_string(), "Score not found");

    let err = score::get_by_student(&api, "5f0c1a2e-0003").await.unwrap_err();
    assert_eq!(err.to_string(), "Score not found for this student");
    assert_eq!(err.code(), 404);

    let s = score::get_by_student(&api, "5f0c1a2e-0002").await.unwrap();
    assert_eq!(s.score_midterm.as_deref(), Some("65.5"));
    assert_eq!(s.score_quiz2.as_deref(), Some(""));
    assert_eq!(s.score_finalexam, None);
}

#[tokio::test]
async fn test_score_upsert_uses_create_endpoint() {
    let api = client(fixture_backend);
    let saved = score::upsert(
        &api,
        &UpsertScoreRequest {
            f_student_uuid: "5f0c1a2e-0001".into(),
            update_field: ScoreField::Quiz2,
            score_value: "80".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(saved.score_quiz2.as_deref(), Some("80"));
    assert_eq!(api.transport().paths(), ["/Score_MetadataWriter/create"]);
}

#[tokio::test]
async fn test_score_server_rejection_keeps_details() {
    let api = client(fixture_backend);
    let err = score::upsert(
        &api,
        &UpsertScoreRequest {
            f_student_uuid: "5f0c1a2e-0001".into(),
            update_field: ScoreField::Quiz1,
            score_value: "200".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), 422);
    assert_eq!(err.to_string(), "Score must be between 0 and 100");
    assert!(err.details().unwrap().contains_key("score_value"));
}

#[tokio::test]
async fn test_calculate_final_and_statistics() {
    let api = client(|req| match req.path.as_str() {
        "/Score_MetadataWriter/calculation_final" => {
            assert_eq!(json_body(req), &json!({ "test_semester": "1141", "passing_score": 60 }));
            ok(json!({ "updated_count": 3 }))
        }
        "/Score_MetadataWriter/test_score" => {
            assert_eq!(
                json_body(req),
                &json!({ "score_semester": "1141", "score_field": "score_total", "exclude_empty": true })
            );
            ok(json!({
                "semester": "1141",
                "score_field": "score_total",
                "total_count": 2,
                "average": 76.3,
                "median": 76.3
            }))
        }
        other => panic!("unexpected call to {}", other),
    });

    let calc = score::calculate_final(
        &api,
        &CalculateFinalScoresRequest {
            test_semester: "1141".into(),
            passing_score: 60,
        },
    )
    .await
    .unwrap();
    assert_eq!(calc.updated_count, 3);

    let stats = score::test_statistics(
        &api,
        &TestStatisticsRequest {
            score_semester: "1141".into(),
            score_field: ScoreColumn::Total,
            exclude_empty: Some(true),
        },
    )
    .await
    .unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.median, 76.3);
}

#[tokio::test]
async fn test_step_diagram_returns_image_bytes() {
    let api = client(|req| {
        assert_eq!(
            json_body(req),
            &json!({
                "test_semester": "1141",
                "score_field": "score_midterm",
                "bins": { "type": "fixed_width", "width": 10.0 },
                "format": "png"
            })
        );
        Ok(TransportResponse::bytes(200, "image/png", vec![0x89, b'P', b'N', b'G']))
    });
    let bytes = score::step_diagram(
        &api,
        &GenerateScoreDiagramRequest {
            test_semester: "1141".into(),
            score_field: ScoreField::Midterm,
            bins: Some(DiagramBins::FixedWidth { width: 10.0 }),
            title: None,
            format: Some(DiagramFormat::Png),
        },
    )
    .await
    .unwrap();
    assert_eq!(&bytes[1..], b"PNG");
}

#[tokio::test]
async fn test_exam_get_accepts_object_or_list() {
    let api = client(fixture_backend);
    let exam = exam::get(&api, "t-1141-2").await.unwrap();
    assert_eq!(exam.weight(), Some(0.35));

    let err = exam::get(&api, "t-none").await.unwrap_err();
    assert_eq!(err.to_string(), "Test not found");
    assert_eq!(err.code(), 404);

    let api = client(|_| {
        ok(json!({
            "test_uuid": "t-9",
            "test_name": "期末考",
            "test_semester": "1141",
            "test_states": "考卷完成"
        }))
    });
    let exam = exam::get(&api, "t-9").await.unwrap();
    assert_eq!(exam.score_field(), Some(ScoreField::FinalExam));

    let api = client(|_| ok(serde_json::Value::Null));
    assert!(exam::get(&api, "t-9").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_semesters_are_distinct_newest_first() {
    let api = client(fixture_backend);
    assert_eq!(exam::semesters(&api).await.unwrap(), ["1141", "1132"]);
}

#[tokio::test]
async fn test_set_weights_wire_shape() {
    let api = client(|req| {
        assert_eq!(req.path, "/Test_MetadataWriter/setweight");
        assert_eq!(
            json_body(req),
            &json!({ "test_semester": "1141", "weights": { "期中考": "0.4", "期末考": "0.6" } })
        );
        ok(json!({ "updated_count": 2 }))
    });
    let resp = exam::set_weights(
        &api,
        &SetWeightsRequest {
            test_semester: "1141".into(),
            weights: [("期中考", "0.4"), ("期末考", "0.6")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        },
    )
    .await
    .unwrap();
    assert_eq!(resp.updated_count, 2);
}

#[tokio::test]
async fn test_exam_update_state() {
    let api = client(|req| {
        assert_eq!(json_body(req), &json!({ "test_uuid": "t-1141-3", "test_states": "考卷完成" }));
        let mut exam = common::filtered("exams.json", &json!({ "test_uuid": "t-1141-3" }))[0].clone();
        exam["test_states"] = json!("考卷完成");
        ok(exam)
    });
    let exam = exam::update_state(
        &api,
        &UpdateExamStateRequest {
            test_uuid: "t-1141-3".into(),
            test_states: ExamState::Created,
        },
    )
    .await
    .unwrap();
    assert_eq!(exam.test_states, ExamState::Created);
}

#[tokio::test]
async fn test_file_upload_with_unknown_state_still_succeeds() {
    let api = client(|_| {
        ok(json!({
            "file_uuid": "f-2",
            "asset_type": "test_pic",
            "file_count": 1,
            "test_states": "考卷已上傳"
        }))
    });
    let resp = file::upload(
        &api,
        UploadFileRequest {
            test_uuid: "t-1141-3".into(),
            asset_type: AssetType::TestPic,
            files: vec![UploadedFile::new("scan.png", b"png".to_vec())],
        },
    )
    .await
    .unwrap();
    assert_eq!(resp.file_uuid, "f-2");
    assert_eq!(resp.test_states.as_deref(), Some("考卷已上傳"));
    assert_eq!(resp.state(), None);
}

#[tokio::test]
async fn test_file_upload_parts_in_order() {
    let api = client(|_| {
        ok(json!({
            "file_uuid": "f-1",
            "asset_type": "paper",
            "file_count": 2,
            "mongodb_id": "65f0",
            "test_states": "考卷完成"
        }))
    });
    let resp = file::upload(
        &api,
        UploadFileRequest {
            test_uuid: "t-1141-3".into(),
            asset_type: AssetType::Paper,
            files: vec![
                UploadedFile::new("p1.pdf", b"1".to_vec()),
                UploadedFile::new("p2.pdf", b"2".to_vec()),
            ],
        },
    )
    .await
    .unwrap();
    assert_eq!(resp.file_count, 2);
    assert_eq!(resp.state(), Some(ExamState::Created));

    let calls = api.transport().calls();
    let Payload::Multipart(parts) = &calls[0].payload else {
        panic!("expected multipart");
    };
    let names: Vec<&str> = parts
        .iter()
        .map(|p| match p {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name.as_str(),
        })
        .collect();
    assert_eq!(names, ["test_uuid", "asset_type", "file", "file"]);
    assert_eq!(
        parts[1],
        FormPart::Text {
            name: "asset_type".into(),
            value: "paper".into()
        }
    );
}

#[tokio::test]
async fn test_file_upload_failure_fallback() {
    let api = client(|_| Ok(TransportResponse::json(200, &json!({ "status": "error" }))));
    let err = file::upload(
        &api,
        UploadFileRequest {
            test_uuid: "t-1".into(),
            asset_type: AssetType::TestPic,
            files: vec![UploadedFile::new("a.png", vec![1])],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Upload failed");
}

#[tokio::test]
async fn test_file_replace_download_delete() {
    let api = client(|req| match req.path.as_str() {
        "/test-filedata/update" => ok(json!({ "file_uuid": "f-1", "asset_type": "histogram" })),
        "/test-filedata/read" => Ok(TransportResponse::bytes(200, "application/pdf", b"%PDF".to_vec())),
        "/test-filedata/delete" => {
            assert_eq!(json_body(req), &json!({ "uid": "f-1", "asset_type": "histogram" }));
            ok(serde_json::Value::Null)
        }
        other => panic!("unexpected call to {}", other),
    });

    let updated = file::update(
        &api,
        UpdateFileRequest {
            uid: "f-1".into(),
            asset_type: AssetType::Histogram,
            file: UploadedFile::new("h.png", vec![0]),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.asset_type, AssetType::Histogram);

    let bytes = file::download(
        &api,
        &DownloadFileRequest {
            test_pic_uuid: "f-1".into(),
            asset_type: AssetType::Histogram,
        },
    )
    .await
    .unwrap();
    assert_eq!(bytes, b"%PDF");

    file::delete(
        &api,
        &DeleteFileRequest {
            uid: "f-1".into(),
            asset_type: AssetType::Histogram,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_transport_errors_become_network_errors() {
    let api = client(|_| Err(TransportError::Connect("connection refused".into())));
    let err = exam::list(&api, &ExamFilters::default()).await.unwrap_err();
    assert_eq!(err.code(), 500);
    assert_eq!(err.to_string(), "Network error - unable to reach server");

    let api = client(|_| fail("Semester is locked", 409));
    let err = exam::delete(&api, "t-1").await.unwrap_err();
    assert_eq!(err.code(), 409);
}

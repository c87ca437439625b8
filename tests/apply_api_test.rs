mod common;

use axum::http::{header, StatusCode};
use common::{app, ApplyForm};
use serde_json::json;

async fn rejection(form: ApplyForm) -> String {
    let app = app();
    let reply = app.apply(&form, None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", reply.text());
    let body = reply.json();
    assert_eq!(body["success"], false);
    body["message"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn second_submission_with_same_email_conflicts() {
    let app = app();
    let admin = app.admin_token().await;
    assert_eq!(app.apply(&ApplyForm::budi(), None).await.status, StatusCode::CREATED);

    let again = app
        .apply(&ApplyForm::new("Budi Lagi", "budi@test.id", "089876543210"), None)
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.json()["message"], "Email sudah mendaftar!");

    let listed = app.get("/api/apply", Some(&admin)).await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn form_checks_run_in_order() {
    assert_eq!(
        rejection(ApplyForm::budi().set("name", "")).await,
        "Semua field harus diisi"
    );
    assert_eq!(
        rejection(ApplyForm::budi().set("educationLevel", "")).await,
        "Silakan pilih tingkat pendidikan"
    );
    assert_eq!(
        rejection(ApplyForm::budi().set("prodi", "")).await,
        "Silakan lengkapi nama universitas, prodi, dan semester"
    );
    assert_eq!(
        rejection(ApplyForm::budi().set("educationLevel", "SMK").set("schoolName", "SMKN 1")).await,
        "Silakan lengkapi nama sekolah dan jurusan"
    );
    assert_eq!(
        rejection(ApplyForm::budi().set("radarCireubonPosition", "")).await,
        "Silakan pilih posisi di Radar Cirebon"
    );
}

#[tokio::test]
async fn phone_numbers_are_checked() {
    assert_eq!(
        rejection(ApplyForm::budi().set("phone", "0812345")).await,
        "Nomor telepon harus antara 10-15 angka"
    );
    assert_eq!(
        rejection(ApplyForm::budi().set("phone", "0812345678901234")).await,
        "Nomor telepon harus antara 10-15 angka"
    );
    for phone in ["0812-3456-7890", "0812+3456+7890", "081234567890+", "++6281234567890"] {
        assert_eq!(
            rejection(ApplyForm::budi().set("phone", phone)).await,
            "Nomor telepon hanya boleh berisi angka dan simbol +",
            "{phone}"
        );
    }

    let app = app();
    let ok = app
        .apply(&ApplyForm::budi().set("phone", "+6281234567890"), None)
        .await;
    assert_eq!(ok.status, StatusCode::CREATED);
}

#[tokio::test]
async fn only_small_pdfs_are_accepted() {
    assert_eq!(
        rejection(ApplyForm::budi().file("cv.docx", "application/msword", b"PK\x03\x04")).await,
        "File harus berformat PDF"
    );

    let mut big = b"%PDF-1.4\n".to_vec();
    big.resize(5 * 1024 * 1024 + 1, b'x');
    assert_eq!(
        rejection(ApplyForm::budi().file("cv.pdf", "application/pdf", &big)).await,
        "Ukuran file maksimal 5MB"
    );
}

#[tokio::test]
async fn resume_is_served_inline_to_admins_and_owner() {
    let app = app();
    let admin = app.admin_token().await;
    let owner = app.user_token("budi.akun@test.id").await;
    let stranger = app.user_token("lain@test.id").await;

    let id = app.apply(&ApplyForm::budi(), Some(&owner)).await.json()["applicant"]["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/apply/{}", id);

    let pdf = app.get(&uri, Some(&admin)).await;
    assert_eq!(pdf.status, StatusCode::OK);
    assert_eq!(pdf.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        pdf.headers[header::CONTENT_DISPOSITION],
        "inline; filename=\"cv-budi.pdf\""
    );
    assert_eq!(pdf.headers[header::CACHE_CONTROL], "public, max-age=3600");
    assert!(pdf.body.starts_with(b"%PDF"));

    assert_eq!(app.get(&uri, Some(&owner)).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&stranger)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&uri, None).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn legacy_and_missing_files() {
    let app = app();
    let admin = app.admin_token().await;
    let id = app.apply(&ApplyForm::budi(), None).await.json()["applicant"]["id"]
        .as_i64()
        .unwrap() as i32;

    app.store
        .set_legacy_file_url(id, "https://files.example.id/cv-budi.pdf")
        .unwrap();
    let redirect = app.get(&format!("/api/apply/{}", id), Some(&admin)).await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(
        redirect.headers[header::LOCATION],
        "https://files.example.id/cv-budi.pdf"
    );

    app.store.set_legacy_file_url(id, "").unwrap();
    let missing = app.get(&format!("/api/apply/{}", id), Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.text().contains("<h1>File tidak ditemukan</h1>"));

    let unknown = app.get("/api/apply/999", Some(&admin)).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.json()["success"], false);

    let garbled = app.get("/api/apply/abc", Some(&admin)).await;
    assert_eq!(garbled.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_list_filters_by_status() {
    let app = app();
    let admin = app.admin_token().await;
    let first = app.apply(&ApplyForm::budi(), None).await.json()["applicant"]["id"]
        .as_i64()
        .unwrap();
    app.apply(&ApplyForm::new("Siti", "siti@test.id", "081298765432"), None)
        .await;

    app.post_json(
        "/api/update-status",
        Some(&admin),
        json!({"id": first, "status": "ACCEPTED"}),
    )
    .await;

    let all = app.get("/api/apply", Some(&admin)).await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["name"], "Siti");

    let pending = app.get("/api/apply?status=PENDING", Some(&admin)).await.json();
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["email"], "siti@test.id");

    let bad = app.get("/api/apply?status=APPROVED", Some(&admin)).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let user = app.user_token("pelamar@test.id").await;
    assert_eq!(app.get("/api/apply", Some(&user)).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_and_api_document() {
    let app = app();
    let health = app.get("/api/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "healthy");

    let doc = app.get("/api/openapi.json", None).await.json();
    assert!(doc["paths"]["/api/update-status"].is_object());
    assert!(doc["paths"]["/api/notifications/wait"].is_object());
}

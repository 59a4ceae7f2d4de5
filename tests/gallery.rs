use actix_web::{
    test::{call_service, init_service, TestRequest},
    web,
};
use anyhow::Result;
use mandir::create_web_app;
use serde_json::{json, Value};
use util::{create_test_state, Part};

mod util;

const MIB: usize = 1024 * 1024;

#[actix_rt::test]
async fn upload_limits() -> Result<()> {
    let (state, dir) = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let token = util::admin_token(&app).await?;
    let gallery_dir = dir.path().join("gallery");

    let (val, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        &token,
        &[Part::file("image", "huge.jpg", "image/jpeg", 6 * MIB)],
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(val["success"], json!(false));
    assert_eq!(util::count_files(&gallery_dir), 0);

    let (_, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        &token,
        &[Part::file("image", "notes.txt", "text/plain", 100)],
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(util::count_files(&gallery_dir), 0);

    // requires admin
    let (_, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        "invalid",
        &[Part::file("image", "temple.jpg", "image/jpeg", 100)],
    )
    .await?;
    assert_eq!(status, 401);

    let (val, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        &token,
        &[
            Part::file("image", "one.jpg", "image/jpeg", 100),
            Part::file("image", "two.jpg", "image/jpeg", 100),
        ],
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(val["message"], json!("Too many files, at most 1 per upload"));
    assert_eq!(util::count_files(&gallery_dir), 0);

    let (val, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        &token,
        &[Part::text("category", "temple")],
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(val["message"], json!("No image file provided"));

    let (val, status) = util::auth_upload(
        &app,
        "/api/gallery/upload",
        &token,
        &[
            Part::text("category", "festival"),
            Part::file("image", "temple.jpg", "image/jpeg", 2 * MIB),
        ],
    )
    .await?;
    assert_eq!(status, 201);
    let filename = val["data"]["filename"].as_str().unwrap_or_default().to_owned();
    let path = val["data"]["path"].as_str().unwrap_or_default().to_owned();
    assert_ne!(filename, "temple.jpg");
    assert!(filename.ends_with(".jpg"));
    assert_eq!(path, format!("/uploads/gallery/{}", filename));
    assert_eq!(val["data"]["originalName"], json!("temple.jpg"));
    assert_eq!(val["data"]["category"], json!("festival"));
    assert_eq!(val["data"]["uploadedBy"], json!("admin"));
    assert_eq!(val["data"]["isActive"], json!(true));
    assert_eq!(util::count_files(&gallery_dir), 1);

    let res = call_service(&app, TestRequest::with_uri(&path).to_request()).await;
    assert_eq!(res.status(), 200);
    Ok(())
}

#[actix_rt::test]
async fn bulk_upload() -> Result<()> {
    let (state, dir) = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let token = util::admin_token(&app).await?;

    let (val, status) = util::auth_upload(
        &app,
        "/api/gallery/bulk-upload",
        &token,
        &[
            Part::file("images", "a.png", "image/png", 10),
            Part::file("images", "b.webp", "image/webp", 10),
        ],
    )
    .await?;
    assert_eq!(status, 201);
    assert_eq!(val["message"], json!("2 images uploaded successfully"));
    assert_eq!(val["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(val["data"][0]["category"], json!("temple"));

    // one bad file rejects the batch before anything is written
    let (_, status) = util::auth_upload(
        &app,
        "/api/gallery/bulk-upload",
        &token,
        &[
            Part::file("images[]", "c.gif", "image/gif", 10),
            Part::file("images[]", "d.svg", "image/svg+xml", 10),
        ],
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(util::count_files(&dir.path().join("gallery")), 2);

    let parts = (0..11)
        .map(|_| Part::file("images", "e.jpg", "image/jpeg", 10))
        .collect::<Vec<_>>();
    let (_, status) = util::auth_upload(&app, "/api/gallery/bulk-upload", &token, &parts).await?;
    assert_eq!(status, 400);
    assert_eq!(util::count_files(&dir.path().join("gallery")), 2);
    Ok(())
}

async fn upload_one<S, B>(app: &S, token: &str, category: &str) -> Result<Value>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let (val, status) = util::auth_upload(
        app,
        "/api/gallery/upload",
        token,
        &[
            Part::text("category", category),
            Part::file("image", "photo.jpeg", "image/jpeg", 10),
        ],
    )
    .await?;
    assert_eq!(status, 201);
    Ok(val["data"].clone())
}

#[actix_rt::test]
async fn likes_and_views() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let token = util::admin_token(&app).await?;
    let image = upload_one(&app, &token, "temple").await?;
    let like = format!("/api/gallery/{}/like", image["id"]);

    let (val, status) = util::post(&app, &like, json!({"action": "like"})).await?;
    assert_eq!(status, 200);
    assert_eq!(val["data"]["likes"], json!(1));
    let (val, _) = util::post(&app, &like, json!({"action": "unlike"})).await?;
    assert_eq!(val["data"]["likes"], json!(0));
    assert_eq!(val["message"], json!("Image unliked successfully"));

    // never below zero
    let (val, _) = util::post(&app, &like, json!({"action": "unlike"})).await?;
    assert_eq!(val["data"]["likes"], json!(0));

    util::post(&app, &like, json!({})).await?;
    let (val, _) = util::post(&app, &like, json!({"action": "like"})).await?;
    assert_eq!(val["data"]["likes"], json!(2));

    let (_, status) = util::post(&app, &like, json!({"action": "love"})).await?;
    assert_eq!(status, 400);
    let (_, status) = util::post(&app, "/api/gallery/999/like", json!({})).await?;
    assert_eq!(status, 404);

    let path = format!("/api/gallery/{}", image["id"]);
    let (val, _) = util::get(&app, &path).await?;
    assert_eq!(val["data"]["views"], json!(1));
    let (val, _) = util::get(&app, &path).await?;
    assert_eq!(val["data"]["views"], json!(2));

    let (val, _) = util::get(&app, "/api/gallery/stats/overview").await?;
    assert_eq!(val["data"]["total"], json!(1));
    assert_eq!(val["data"]["active"], json!(1));
    assert_eq!(val["data"]["totalViews"], json!(2));
    assert_eq!(val["data"]["totalLikes"], json!(2));
    Ok(())
}

#[actix_rt::test]
async fn update_list_delete() -> Result<()> {
    let (state, dir) = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let token = util::admin_token(&app).await?;

    let (val, _) = util::get(&app, "/api/gallery/stats/overview").await?;
    assert_eq!(val["data"]["totalViews"], json!(0));
    assert_eq!(val["data"]["categoryDistribution"], json!([]));

    let first = upload_one(&app, &token, "temple").await?;
    upload_one(&app, &token, "festival").await?;
    upload_one(&app, &token, "festival").await?;

    let (val, _) = util::get(&app, "/api/gallery").await?;
    assert_eq!(val["pagination"]["total"], json!(3));
    assert_eq!(val["data"][2]["id"], first["id"]);

    let (val, _) = util::get(&app, "/api/gallery?category=festival").await?;
    assert_eq!(val["pagination"]["total"], json!(2));

    let path = format!("/api/gallery/{}", first["id"]);
    let (val, status) = util::auth_patch(
        &app,
        &path,
        &token,
        json!({"isActive": false, "notes": "blurry"}),
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(val["data"]["isActive"], json!(false));
    assert_eq!(val["data"]["notes"], json!("blurry"));
    assert_eq!(val["data"]["category"], json!("temple"));

    let (val, _) = util::get(&app, "/api/gallery").await?;
    assert_eq!(val["pagination"]["total"], json!(2));
    let (val, _) = util::get(&app, "/api/gallery?active=false").await?;
    assert_eq!(val["pagination"]["total"], json!(1));

    let (val, _) = util::get(&app, "/api/gallery/stats/overview").await?;
    assert_eq!(val["data"]["active"], json!(2));
    assert_eq!(
        val["data"]["categoryDistribution"],
        json!([{"_id": "festival", "count": 2}, {"_id": "temple", "count": 1}])
    );

    let filename = first["filename"].as_str().unwrap_or_default();
    let file = dir.path().join("gallery").join(filename);
    assert!(file.exists());
    let (val, status) = util::auth_delete(&app, &path, &token).await?;
    assert_eq!(status, 200);
    assert_eq!(val["message"], json!("Image deleted successfully"));
    assert!(!file.exists());
    let (_, status) = util::get(&app, &path).await?;
    assert_eq!(status, 404);
    let (_, status) = util::auth_delete(&app, &path, &token).await?;
    assert_eq!(status, 404);
    Ok(())
}

use anyhow::Result;
use entity::{member, prashad, sequence};
use mandir::{
    asset::{IncomingFile, GALLERY},
    form::{Booking, Join},
    kinds::MEMBER,
    record, Error,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use util::create_test_state;

mod util;

fn join(email: &str) -> Join {
    Join {
        name: "Asha".to_owned(),
        father_name: "Ramesh".to_owned(),
        religion: "Hindu".to_owned(),
        pincode: "110001".to_owned(),
        email: email.to_owned(),
        contact_no: "99".to_owned(),
        notes: None,
    }
}

fn jpeg(name: &str) -> IncomingFile {
    IncomingFile {
        original_name: name.to_owned(),
        content_type: "image/jpeg".to_owned(),
        bytes: vec![1, 2, 3],
    }
}

#[actix_rt::test]
async fn member_ids_are_not_reused() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;

    let a = service.join(join("a@x.com")).await?;
    let b = service.join(join("b@x.com")).await?;
    assert_eq!(a.member_id, "SC0001");
    assert_eq!(b.member_id, "SC0002");

    service.delete_member(b.id).await?;
    let c = service.join(join("c@x.com")).await?;
    assert_eq!(c.member_id, "SC0003");

    let res = service.join(join("a@x.com")).await;
    assert!(matches!(res, Err(Error::Duplicate(_))));
    // a rejected join does not consume an id
    let d = service.join(join("d@x.com")).await?;
    assert_eq!(d.member_id, "SC0004");
    Ok(())
}

#[actix_rt::test]
async fn concurrent_first_joins() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;

    let seed = sequence::Entity::find_by_id("member".to_owned())
        .one(service.db())
        .await?
        .map(|s| s.value);
    assert_eq!(seed, Some(0));

    let (a, b) = futures::join!(service.join(join("a@x.com")), service.join(join("b@x.com")));
    let mut ids = vec![a?.member_id, b?.member_id];
    ids.sort();
    assert_eq!(ids, vec!["SC0001", "SC0002"]);
    Ok(())
}

#[actix_rt::test]
async fn member_id_clash_is_not_an_email_clash() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;

    // a row holding the next id, written around the allocator
    member::ActiveModel {
        name: Set("Old".to_owned()),
        father_name: Set("Old".to_owned()),
        religion: Set("Hindu".to_owned()),
        pincode: Set("110001".to_owned()),
        email: Set("old@x.com".to_owned()),
        contact_no: Set("1".to_owned()),
        member_id: Set("SC0001".to_owned()),
        status: Set(member::Status::Pending),
        join_date: Set(0),
        approved_date: Set(None),
        notes: Set(None),
        created_at: Set(0),
        updated_at: Set(0),
        ..Default::default()
    }
    .insert(service.db())
    .await?;

    let res = service.join(join("new@x.com")).await;
    assert!(matches!(res, Err(Error::DbErr(_))));
    let res = service.join(join("old@x.com")).await;
    assert!(matches!(res, Err(Error::Duplicate(_))));
    Ok(())
}

#[actix_rt::test]
async fn transition_guard() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;
    let a = service.join(join("a@x.com")).await?;

    let approved = service
        .set_member_status(a.id, member::Status::Approved, None)
        .await?;
    let stamped = approved.approved_date;
    assert!(stamped.is_some());

    // re-applying keeps the first stamp
    let again = record::transition(
        service.db(),
        &MEMBER,
        a.id,
        member::Status::Approved,
        Some("checked".to_owned()),
    )
    .await?;
    assert_eq!(again.approved_date, stamped);
    assert_eq!(again.notes.as_deref(), Some("checked"));

    let res = service
        .set_member_status(a.id, member::Status::Rejected, None)
        .await;
    assert!(matches!(res, Err(Error::InvalidTransition(_))));
    let res = service
        .set_member_status(100, member::Status::Rejected, None)
        .await;
    assert!(matches!(res, Err(Error::NotFound("Member"))));
    Ok(())
}

#[actix_rt::test]
async fn booking_lifecycle() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;
    let booking = service
        .create_booking(Booking::Mahaprasad {
            name: "Gopal".to_owned(),
            phone: "1".to_owned(),
            father_name: "Hari".to_owned(),
            notes: None,
        })
        .await?;
    assert_eq!(booking.amount, 101);
    assert_eq!(booking.r#type, prashad::Type::Mahaprasad);

    let confirmed = service
        .set_booking_status(booking.id, prashad::Status::Confirmed, None)
        .await?;
    assert_eq!(confirmed.delivery_date, None);
    let cancelled = service
        .set_booking_status(booking.id, prashad::Status::Cancelled, Some("no stock".to_owned()))
        .await?;
    assert_eq!(cancelled.delivery_date, None);
    assert_eq!(cancelled.notes.as_deref(), Some("no stock"));

    let stats = service.booking_stats().await?;
    assert_eq!(stats.total, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.mahaprasad, 1);
    assert_eq!(stats.prashad, 0);
    Ok(())
}

#[actix_rt::test]
async fn empty_stats() -> Result<()> {
    let (state, _dir) = create_test_state().await?;
    let service = &state.service;

    let donations = service.donation_stats().await?;
    assert_eq!(donations.total_amount, 0.0);
    assert_eq!(donations.count, 0);
    assert!(donations.monthly_donations.is_empty());

    let gallery = service.gallery_stats().await?;
    assert_eq!(gallery.total_views, 0);
    assert_eq!(gallery.total_likes, 0);

    let members = service.member_stats().await?;
    assert_eq!(members.total, 0);
    assert_eq!(members.pending, 0);
    Ok(())
}

#[actix_rt::test]
async fn gallery_sweep() -> Result<()> {
    let (state, dir) = create_test_state().await?;
    let service = &state.service;

    let images = service
        .add_images(&[jpeg("a.jpg"), jpeg("b.jpg")], "temple", "admin")
        .await?;
    assert_eq!(images.len(), 2);

    // orphan left by an interrupted upload
    let orphan = service.assets().store(GALLERY, &jpeg("c.jpg")).await?;
    assert_eq!(util::count_files(&dir.path().join(GALLERY)), 3);

    assert_eq!(service.sweep_gallery().await?, 1);
    assert_eq!(util::count_files(&dir.path().join(GALLERY)), 2);
    assert!(!service.assets().exists(GALLERY, &orphan.filename).await);

    service.delete_image(images[0].id).await?;
    assert_eq!(util::count_files(&dir.path().join(GALLERY)), 1);
    assert_eq!(service.sweep_gallery().await?, 0);

    let res = service
        .add_images(&[jpeg("d.jpg"), jpeg("e.bmp")], "temple", "admin")
        .await;
    assert!(matches!(res, Err(Error::Rejected(_))));
    assert_eq!(util::count_files(&dir.path().join(GALLERY)), 1);
    Ok(())
}

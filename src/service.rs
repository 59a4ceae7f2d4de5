use crate::{
    allocator,
    asset::{self, AssetStore, IncomingFile},
    form::{Booking, DonationForm, EventForm, ImagePatch, Join, Like},
    kinds::{BOOKING, DONATION, EVENT, IMAGE, MEMBER},
    now,
    record::{self, count_of, Bucket, ListQuery, MonthBucket, Page},
    Error, Result,
};
use entity::{donation, event, gallery, member, prashad};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info};

const DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub total_amount: f64,
    pub count: u64,
    pub purpose_distribution: Vec<Bucket>,
    pub monthly_donations: Vec<MonthBucket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total: u64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub religion_distribution: Vec<Bucket>,
    pub monthly_joins: Vec<MonthBucket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: u64,
    pub mahaprasad: i64,
    pub prashad: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub delivered: i64,
    pub cancelled: i64,
    pub monthly_bookings: Vec<MonthBucket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryStats {
    pub total: u64,
    pub active: u64,
    pub total_views: i64,
    pub total_likes: i64,
    pub category_distribution: Vec<Bucket>,
    pub monthly_uploads: Vec<MonthBucket>,
}

/// Which events a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// from today on
    Upcoming,
    /// before today
    Past,
}

impl EventFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("upcoming") => Self::Upcoming,
            Some("past") => Self::Past,
            _ => Self::All,
        }
    }

    fn condition(&self, now: i64) -> Condition {
        let today = now - now.rem_euclid(DAY);
        match self {
            Self::All => Condition::all(),
            Self::Upcoming => Condition::all().add(event::Column::Date.gte(today)),
            Self::Past => Condition::all().add(event::Column::Date.lt(today)),
        }
    }
}

/// Unique violation on `field` as a client error, anything else stays a db error.
fn duplicate(err: DbErr, field: &str, message: &str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if violates(&detail, field) => {
            Error::Duplicate(message.to_owned())
        }
        _ => err.into(),
    }
}

// `community_members.email` on sqlite, `uq_member_email` in postgres and mysql
fn violates(detail: &str, field: &str) -> bool {
    detail
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word == field || word.ends_with(&format!("_{}", field)))
}

/// Record service shared by the http handlers
pub struct Service {
    conn: DbConn,
    assets: AssetStore,
}

impl Service {
    pub fn new(conn: DbConn, assets: AssetStore) -> Self {
        Self { conn, assets }
    }

    pub fn db(&self) -> &DbConn {
        &self.conn
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    // donations

    pub async fn create_donation(&self, form: DonationForm) -> Result<donation::Model> {
        form.validate()?;
        let purpose = form.purpose();
        Ok(donation::ActiveModel {
            name: Set(form.name.unwrap_or_default().trim().to_owned()),
            email: Set(form.email),
            phone: Set(form.phone),
            amount: Set(form.amount.unwrap_or_default()),
            purpose: Set(purpose),
            payment_method: Set(form.payment_method),
            message: Set(form.message),
            user_id: Set(form.user_id),
            timestamp: Set(now() as i64),
            ..Default::default()
        }
        .insert(self.db())
        .await?)
    }

    pub async fn donations(&self, query: &ListQuery) -> Result<Page<donation::Model>> {
        record::list(self.db(), &DONATION, query, Condition::all()).await
    }

    pub async fn donation(&self, id: i32) -> Result<donation::Model> {
        record::find(self.db(), &DONATION, id).await
    }

    pub async fn delete_donation(&self, id: i32) -> Result<()> {
        record::delete(self.db(), &DONATION, id).await
    }

    pub async fn donation_stats(&self) -> Result<DonationStats> {
        let db = self.db();
        Ok(DonationStats {
            total_amount: record::sum_f64::<donation::Entity>(db, donation::Column::Amount).await?,
            count: record::count::<donation::Entity>(db, Condition::all()).await?,
            purpose_distribution: record::group_count::<donation::Entity>(
                db,
                donation::Column::Purpose,
            )
            .await?,
            monthly_donations: record::monthly(db, &DONATION).await?,
        })
    }

    // events

    pub async fn events(&self, query: &ListQuery) -> Result<Page<event::Model>> {
        let filter = EventFilter::parse(query.get("filter"));
        record::list(self.db(), &EVENT, query, filter.condition(now() as i64)).await
    }

    pub async fn event(&self, id: i32) -> Result<event::Model> {
        record::find(self.db(), &EVENT, id).await
    }

    pub async fn create_event(&self, form: EventForm) -> Result<event::Model> {
        let date = form.validate_new()?;
        let time = now() as i64;
        Ok(event::ActiveModel {
            name: Set(form.name.unwrap_or_default().trim().to_owned()),
            description: Set(form.description),
            date: Set(date),
            time: Set(form.time),
            location: Set(form.location),
            price: Set(form.price.unwrap_or_default()),
            capacity: Set(form.capacity.unwrap_or_default()),
            image: Set(form.image),
            created_at: Set(time),
            updated_at: Set(time),
            ..Default::default()
        }
        .insert(self.db())
        .await?)
    }

    /// Overwrite the fields present in `form`.
    pub async fn update_event(&self, id: i32, form: EventForm) -> Result<event::Model> {
        let date = form.validate_update()?;
        let mut model: event::ActiveModel = self.event(id).await?.into();
        if let Some(name) = form.name {
            model.name = Set(name.trim().to_owned());
        }
        if let Some(date) = date {
            model.date = Set(date);
        }
        if form.description.is_some() {
            model.description = Set(form.description);
        }
        if form.time.is_some() {
            model.time = Set(form.time);
        }
        if form.location.is_some() {
            model.location = Set(form.location);
        }
        if let Some(price) = form.price {
            model.price = Set(price);
        }
        if let Some(capacity) = form.capacity {
            model.capacity = Set(capacity);
        }
        if form.image.is_some() {
            model.image = Set(form.image);
        }
        model.updated_at = Set(now() as i64);
        model.update(self.db()).await?;
        self.event(id).await
    }

    pub async fn delete_event(&self, id: i32) -> Result<()> {
        record::delete(self.db(), &EVENT, id).await
    }

    pub async fn upload_event_image(&self, file: &IncomingFile) -> Result<asset::Stored> {
        self.assets.store(asset::EVENTS, file).await
    }

    // community

    /// Register a membership request with the next `SC####` id.
    pub async fn join(&self, join: Join) -> Result<member::Model> {
        let txn = self.db().begin().await?;
        let exists = member::Entity::find()
            .filter(member::Column::Email.eq(join.email.as_str()))
            .one(&txn)
            .await?;
        if exists.is_some() {
            return Err(Error::Duplicate("Email already registered".to_owned()));
        }

        let member_id = allocator::next_member_id(&txn).await?;
        let time = now() as i64;
        let model = member::ActiveModel {
            name: Set(join.name),
            father_name: Set(join.father_name),
            religion: Set(join.religion),
            pincode: Set(join.pincode),
            email: Set(join.email),
            contact_no: Set(join.contact_no),
            member_id: Set(member_id),
            status: Set(member::Status::Pending),
            join_date: Set(time),
            approved_date: Set(None),
            notes: Set(join.notes),
            created_at: Set(time),
            updated_at: Set(time),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate(e, "email", "Email already registered"))?;
        txn.commit().await?;
        info!(member_id = model.member_id.as_str(), "new membership request");
        Ok(model)
    }

    pub async fn members(&self, query: &ListQuery) -> Result<Page<member::Model>> {
        record::list(self.db(), &MEMBER, query, Condition::all()).await
    }

    pub async fn member(&self, id: i32) -> Result<member::Model> {
        record::find(self.db(), &MEMBER, id).await
    }

    pub async fn member_by_email(&self, email: &str) -> Result<member::Model> {
        member::Entity::find()
            .filter(member::Column::Email.eq(email.trim()))
            .one(self.db())
            .await?
            .ok_or(Error::NotFound("Email"))
    }

    pub async fn set_member_status(
        &self,
        id: i32,
        status: member::Status,
        notes: Option<String>,
    ) -> Result<member::Model> {
        record::transition(self.db(), &MEMBER, id, status, notes).await
    }

    pub async fn delete_member(&self, id: i32) -> Result<()> {
        record::delete(self.db(), &MEMBER, id).await
    }

    pub async fn member_stats(&self) -> Result<MemberStats> {
        let db = self.db();
        let status = record::group_count::<member::Entity>(db, member::Column::Status).await?;
        Ok(MemberStats {
            total: record::count::<member::Entity>(db, Condition::all()).await?,
            pending: count_of(&status, "pending"),
            approved: count_of(&status, "approved"),
            rejected: count_of(&status, "rejected"),
            religion_distribution: record::group_count::<member::Entity>(
                db,
                member::Column::Religion,
            )
            .await?,
            monthly_joins: record::monthly(db, &MEMBER).await?,
        })
    }

    // prashad

    pub async fn create_booking(&self, booking: Booking) -> Result<prashad::Model> {
        let time = now() as i64;
        let mut model = prashad::ActiveModel {
            amount: Set(booking.amount()),
            status: Set(prashad::Status::Pending),
            booking_date: Set(time),
            delivery_date: Set(None),
            created_at: Set(time),
            updated_at: Set(time),
            ..Default::default()
        };
        match booking {
            Booking::Mahaprasad {
                name,
                phone,
                father_name,
                notes,
            } => {
                model.r#type = Set(prashad::Type::Mahaprasad);
                model.name = Set(name);
                model.phone = Set(phone);
                model.father_name = Set(Some(father_name));
                model.village = Set(None);
                model.pincode = Set(None);
                model.address = Set(None);
                model.notes = Set(notes);
            }
            Booking::Prashad {
                name,
                phone,
                village,
                pincode,
                address,
                notes,
            } => {
                model.r#type = Set(prashad::Type::Prashad);
                model.name = Set(name);
                model.phone = Set(phone);
                model.father_name = Set(None);
                model.village = Set(Some(village));
                model.pincode = Set(Some(pincode));
                model.address = Set(Some(address));
                model.notes = Set(notes);
            }
        }
        Ok(model.insert(self.db()).await?)
    }

    pub async fn bookings(&self, query: &ListQuery) -> Result<Page<prashad::Model>> {
        record::list(self.db(), &BOOKING, query, Condition::all()).await
    }

    pub async fn booking(&self, id: i32) -> Result<prashad::Model> {
        record::find(self.db(), &BOOKING, id).await
    }

    pub async fn set_booking_status(
        &self,
        id: i32,
        status: prashad::Status,
        notes: Option<String>,
    ) -> Result<prashad::Model> {
        record::transition(self.db(), &BOOKING, id, status, notes).await
    }

    pub async fn delete_booking(&self, id: i32) -> Result<()> {
        record::delete(self.db(), &BOOKING, id).await
    }

    pub async fn booking_stats(&self) -> Result<BookingStats> {
        let db = self.db();
        let types = record::group_count::<prashad::Entity>(db, prashad::Column::Type).await?;
        let status = record::group_count::<prashad::Entity>(db, prashad::Column::Status).await?;
        Ok(BookingStats {
            total: record::count::<prashad::Entity>(db, Condition::all()).await?,
            mahaprasad: count_of(&types, "mahaprasad"),
            prashad: count_of(&types, "prashad"),
            pending: count_of(&status, "pending"),
            confirmed: count_of(&status, "confirmed"),
            delivered: count_of(&status, "delivered"),
            cancelled: count_of(&status, "cancelled"),
            monthly_bookings: record::monthly(db, &BOOKING).await?,
        })
    }

    // gallery

    /// Store the files and their records, all files are checked before the first write.
    pub async fn add_images(
        &self,
        files: &[IncomingFile],
        category: &str,
        uploaded_by: &str,
    ) -> Result<Vec<gallery::Model>> {
        for file in files {
            if !asset::accepts(&file.original_name, &file.content_type) {
                return Err(Error::Rejected("Only image files are allowed".to_owned()));
            }
        }

        let mut images = Vec::with_capacity(files.len());
        for file in files {
            let stored = self.assets.store(asset::GALLERY, file).await?;
            let time = now() as i64;
            let res = gallery::ActiveModel {
                filename: Set(stored.filename.clone()),
                original_name: Set(file.original_name.clone()),
                path: Set(stored.path),
                category: Set(category.to_owned()),
                uploaded_by: Set(uploaded_by.to_owned()),
                upload_date: Set(time),
                is_active: Set(true),
                views: Set(0),
                likes: Set(0),
                notes: Set(None),
                created_at: Set(time),
                updated_at: Set(time),
                ..Default::default()
            }
            .insert(self.db())
            .await;
            match res {
                Ok(image) => images.push(image),
                Err(err) => {
                    self.assets.remove(asset::GALLERY, &stored.filename).await?;
                    return Err(err.into());
                }
            }
        }
        Ok(images)
    }

    pub async fn images(&self, query: &ListQuery) -> Result<Page<gallery::Model>> {
        let active = !matches!(query.get("active"), Some("false"));
        let cond = Condition::all().add(gallery::Column::IsActive.eq(active));
        record::list(self.db(), &IMAGE, query, cond).await
    }

    pub async fn image(&self, id: i32) -> Result<gallery::Model> {
        record::find(self.db(), &IMAGE, id).await
    }

    /// Fetch an image counting the view.
    pub async fn view_image(&self, id: i32) -> Result<gallery::Model> {
        let res = gallery::Entity::update_many()
            .col_expr(
                gallery::Column::Views,
                Expr::col(gallery::Column::Views).add(1),
            )
            .filter(gallery::Column::Id.eq(id))
            .exec(self.db())
            .await?;
        if res.rows_affected == 0 {
            return Err(Error::NotFound(IMAGE.label));
        }
        self.image(id).await
    }

    pub async fn update_image(&self, id: i32, patch: ImagePatch) -> Result<gallery::Model> {
        let mut model: gallery::ActiveModel = self.image(id).await?.into();
        if let Some(category) = patch.category.filter(|c| !c.trim().is_empty()) {
            model.category = Set(category.trim().to_owned());
        }
        if let Some(active) = patch.is_active {
            model.is_active = Set(active);
        }
        if let Some(notes) = patch.notes.filter(|n| !n.trim().is_empty()) {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(now() as i64);
        model.update(self.db()).await?;
        self.image(id).await
    }

    /// Add or take back a like, returns the current count.
    pub async fn like_image(&self, id: i32, like: Like) -> Result<i32> {
        let mut update = gallery::Entity::update_many().filter(gallery::Column::Id.eq(id));
        update = match like {
            Like::Like => update.col_expr(
                gallery::Column::Likes,
                Expr::col(gallery::Column::Likes).add(1),
            ),
            Like::Unlike => update
                .col_expr(
                    gallery::Column::Likes,
                    Expr::col(gallery::Column::Likes).sub(1),
                )
                .filter(gallery::Column::Likes.gt(0)),
        };
        update.exec(self.db()).await?;
        Ok(self.image(id).await?.likes)
    }

    /// Remove the file first, then the record.
    ///
    /// If the record delete fails the file is already gone, the record is
    /// left pointing to a missing file.
    pub async fn delete_image(&self, id: i32) -> Result<()> {
        let image = self.image(id).await?;
        self.assets.remove(asset::GALLERY, &image.filename).await?;
        if let Err(err) = record::delete(self.db(), &IMAGE, id).await {
            error!(
                error = err.to_string(),
                id,
                filename = image.filename.as_str(),
                "image file removed but record delete failed"
            );
            return Err(err);
        }
        Ok(())
    }

    pub async fn gallery_stats(&self) -> Result<GalleryStats> {
        let db = self.db();
        Ok(GalleryStats {
            total: record::count::<gallery::Entity>(db, Condition::all()).await?,
            active: record::count::<gallery::Entity>(
                db,
                Condition::all().add(gallery::Column::IsActive.eq(true)),
            )
            .await?,
            total_views: record::sum_i64::<gallery::Entity>(db, gallery::Column::Views).await?,
            total_likes: record::sum_i64::<gallery::Entity>(db, gallery::Column::Likes).await?,
            category_distribution: record::group_count::<gallery::Entity>(
                db,
                gallery::Column::Category,
            )
            .await?,
            monthly_uploads: record::monthly(db, &IMAGE).await?,
        })
    }

    /// Remove gallery files no record points to.
    pub async fn sweep_gallery(&self) -> Result<usize> {
        let names: Vec<String> = gallery::Entity::find()
            .select_only()
            .column(gallery::Column::Filename)
            .into_tuple()
            .all(self.db())
            .await?;
        let keep = names.into_iter().collect::<HashSet<_>>();
        self.assets.sweep(asset::GALLERY, &keep).await
    }
}

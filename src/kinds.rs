//! Schemas of the record kinds served by the engine in [`crate::record`].

use crate::record::{Lifecycle, Schema, Sort};
use entity::{donation, event, gallery, member, prashad};

pub const DONATION: Schema<donation::Entity> = Schema {
    label: "Donation",
    id: donation::Column::Id,
    status: None,
    milestone: None,
    notes: None,
    updated_at: None,
    timeline: donation::Column::Timestamp,
    order: &[
        (donation::Column::Timestamp, Sort::Desc),
        (donation::Column::Id, Sort::Desc),
    ],
    filters: &[("purpose", donation::Column::Purpose)],
};

pub const EVENT: Schema<event::Entity> = Schema {
    label: "Event",
    id: event::Column::Id,
    status: None,
    milestone: None,
    notes: None,
    updated_at: Some(event::Column::UpdatedAt),
    timeline: event::Column::Date,
    order: &[
        (event::Column::Date, Sort::Asc),
        (event::Column::Id, Sort::Asc),
    ],
    filters: &[("location", event::Column::Location)],
};

pub const MEMBER: Schema<member::Entity> = Schema {
    label: "Member",
    id: member::Column::Id,
    status: Some(member::Column::Status),
    milestone: Some(member::Column::ApprovedDate),
    notes: Some(member::Column::Notes),
    updated_at: Some(member::Column::UpdatedAt),
    timeline: member::Column::JoinDate,
    order: &[
        (member::Column::JoinDate, Sort::Desc),
        (member::Column::Id, Sort::Desc),
    ],
    filters: &[
        ("status", member::Column::Status),
        ("religion", member::Column::Religion),
    ],
};

pub const BOOKING: Schema<prashad::Entity> = Schema {
    label: "Booking",
    id: prashad::Column::Id,
    status: Some(prashad::Column::Status),
    milestone: Some(prashad::Column::DeliveryDate),
    notes: Some(prashad::Column::Notes),
    updated_at: Some(prashad::Column::UpdatedAt),
    timeline: prashad::Column::BookingDate,
    order: &[
        (prashad::Column::BookingDate, Sort::Desc),
        (prashad::Column::Id, Sort::Desc),
    ],
    filters: &[
        ("type", prashad::Column::Type),
        ("status", prashad::Column::Status),
    ],
};

pub const IMAGE: Schema<gallery::Entity> = Schema {
    label: "Image",
    id: gallery::Column::Id,
    status: None,
    milestone: None,
    notes: Some(gallery::Column::Notes),
    updated_at: Some(gallery::Column::UpdatedAt),
    timeline: gallery::Column::UploadDate,
    order: &[
        (gallery::Column::UploadDate, Sort::Desc),
        (gallery::Column::Id, Sort::Desc),
    ],
    filters: &[("category", gallery::Column::Category)],
};

impl Lifecycle for member::Status {
    fn can_become(&self, next: &Self) -> bool {
        use member::Status::*;
        matches!((self, next), (Pending, Approved) | (Pending, Rejected))
    }

    fn is_milestone(&self) -> bool {
        *self == member::Status::Approved
    }
}

impl Lifecycle for prashad::Status {
    fn can_become(&self, next: &Self) -> bool {
        use prashad::Status::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Delivered) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }

    fn is_milestone(&self) -> bool {
        *self == prashad::Status::Delivered
    }
}

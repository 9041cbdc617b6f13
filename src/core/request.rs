//! Request business logic - Asks for items nobody has listed yet.
//!
//! Requests do not participate in the booking lifecycle; items reference
//! the request that prompted their listing, which is how the "items
//! answering this request" lists are built.

use crate::{
    core::user::get_user_by_id,
    entities::{Item, Request, item, request},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// A request together with the items listed in answer to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestView {
    /// The request row itself
    pub request: request::Model,
    /// Items whose `request_id` points at this request
    pub items: Vec<item::Model>,
}

/// Posts a new request. The requestor must exist.
pub async fn create_request(
    db: &DatabaseConnection,
    requestor_id: i64,
    description: String,
) -> Result<request::Model> {
    get_user_by_id(db, requestor_id).await?;

    if description.trim().is_empty() {
        return Err(Error::Validation {
            message: "request description cannot be empty".to_string(),
        });
    }

    let request = request::ActiveModel {
        description: Set(description),
        requestor_id: Set(requestor_id),
        created: Set(Utc::now()),
        ..Default::default()
    };

    let result = request.insert(db).await?;
    Ok(result)
}

/// Lists the caller's own requests, newest first, with answering items.
pub async fn requests_by_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<RequestView>> {
    get_user_by_id(db, user_id).await?;

    let requests = Request::find()
        .filter(request::Column::RequestorId.eq(user_id))
        .order_by_desc(request::Column::Created)
        .order_by_desc(request::Column::Id)
        .all(db)
        .await?;

    attach_items(db, requests).await
}

/// Lists every other user's requests, newest first, with answering items.
pub async fn requests_of_others(db: &DatabaseConnection, user_id: i64) -> Result<Vec<RequestView>> {
    get_user_by_id(db, user_id).await?;

    let requests = Request::find()
        .filter(request::Column::RequestorId.ne(user_id))
        .order_by_desc(request::Column::Created)
        .order_by_desc(request::Column::Id)
        .all(db)
        .await?;

    attach_items(db, requests).await
}

/// Fetches one request with the items answering it.
pub async fn get_request_by_id(db: &DatabaseConnection, request_id: i64) -> Result<RequestView> {
    let request = Request::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or(Error::RequestNotFound { id: request_id })?;

    let mut views = attach_items(db, vec![request]).await?;
    // attach_items returns exactly one view per input request
    Ok(views.remove(0))
}

/// Hydrates requests with their answering items via one batched item query.
async fn attach_items(
    db: &DatabaseConnection,
    requests: Vec<request::Model>,
) -> Result<Vec<RequestView>> {
    let request_ids: Vec<i64> = requests.iter().map(|r| r.id).collect();

    let mut items_by_request: HashMap<i64, Vec<item::Model>> = HashMap::new();
    let answering = Item::find()
        .filter(item::Column::RequestId.is_in(request_ids))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await?;
    for item in answering {
        if let Some(request_id) = item.request_id {
            items_by_request.entry(request_id).or_default().push(item);
        }
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let items = items_by_request.remove(&request.id).unwrap_or_default();
            RequestView { request, items }
        })
        .collect())
}

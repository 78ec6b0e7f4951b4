//! Inspection items and their attachment to points.
//!
//! Items are shared across projects like points, so none of these go
//! through the access check.

use log::info;

use super::{directory_ops::required, Engine};
use crate::{
    error::{InspectionError, Result},
    models::Item,
    params::{CreateItem, Id, PointItem, UpdateItem},
    store::{Repository, Store},
};

fn find_item(store: &dyn Store, id: u64) -> Result<Item> {
    store.find_item(id)?.ok_or(InspectionError::ItemNotFound { id })
}

fn check_point(store: &dyn Store, id: u64) -> Result<()> {
    match store.find_point(id)? {
        Some(_) => Ok(()),
        None => Err(InspectionError::PointNotFound { id }),
    }
}

impl<R: Repository> Engine<R> {
    pub async fn create_item(&self, params: &CreateItem) -> Result<Item> {
        required("title", &params.title)?;
        required("execution_method", &params.execution_method)?;
        let params = params.clone();

        let item = self.run(move |store| store.create_item(&params)).await?;

        info!("Created item {} ({})", item.id, item.title);
        Ok(item)
    }

    pub async fn get_item(&self, params: &Id) -> Result<Item> {
        let id = params.id;
        self.run(move |store| find_item(store, id)).await
    }

    /// Applies the given changes to an item.
    pub async fn update_item(&self, params: &UpdateItem) -> Result<Item> {
        if let Some(title) = &params.title {
            required("title", title)?;
        }
        if let Some(method) = &params.execution_method {
            required("execution_method", method)?;
        }
        let params = params.clone();

        let item = self
            .run(move |store| {
                let mut item = find_item(store, params.id)?;
                if let Some(title) = params.title {
                    item.title = title;
                }
                if let Some(details) = params.details {
                    item.details = (!details.trim().is_empty()).then_some(details);
                }
                if let Some(method) = params.execution_method {
                    item.execution_method = method;
                }
                store.save_item(&item)?;
                Ok(item)
            })
            .await?;

        info!("Updated item {}", item.id);
        Ok(item)
    }

    /// Deletes an item and detaches it from every point.
    pub async fn delete_item(&self, params: &Id) -> Result<Item> {
        let id = params.id;
        let item = self
            .run(move |store| {
                let item = find_item(store, id)?;
                store.delete_item(id)?;
                Ok(item)
            })
            .await?;

        info!("Deleted item {} ({})", item.id, item.title);
        Ok(item)
    }

    /// Items to carry out at a point.
    pub async fn point_items(&self, params: &Id) -> Result<Vec<Item>> {
        let point_id = params.id;
        self.run(move |store| {
            check_point(store, point_id)?;
            store.items_for_point(point_id)
        })
        .await
    }

    pub async fn attach_item(&self, params: &PointItem) -> Result<Vec<Item>> {
        let PointItem { point_id, item_id } = *params;
        let items = self
            .run(move |store| {
                check_point(store, point_id)?;
                find_item(store, item_id)?;
                store.attach_item(point_id, item_id)?;
                store.items_for_point(point_id)
            })
            .await?;

        info!("Attached item {item_id} to point {point_id}");
        Ok(items)
    }

    /// Fails with `InvalidInput` when the item is not attached to the point.
    pub async fn detach_item(&self, params: &PointItem) -> Result<Vec<Item>> {
        let PointItem { point_id, item_id } = *params;
        let items = self
            .run(move |store| {
                check_point(store, point_id)?;
                if !store.detach_item(point_id, item_id)? {
                    return Err(InspectionError::invalid_input("item_id").with_reason(format!(
                        "Item {item_id} is not attached to point {point_id}"
                    )));
                }
                store.items_for_point(point_id)
            })
            .await?;

        info!("Detached item {item_id} from point {point_id}");
        Ok(items)
    }
}

//! Interactive menus that drive the API through [`ApiClient`].
//!
//! Every action prints its result or its error and returns to the menu it
//! came from; nothing here ends the session except "Exit" or end of input.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::prompt::Prompt;

/// A CRUD resource mounted under the API root.
pub struct Entity {
    pub label: &'static str,
    pub path: &'static str,
    /// Query filters the list endpoint understands, shown as a hint.
    pub filters: &'static str,
}

pub const ENTITIES: &[Entity] = &[
    Entity { label: "Users", path: "/users", filters: "name, age, gender" },
    Entity { label: "Restaurants", path: "/restaurants", filters: "name, category" },
    Entity { label: "Menu items", path: "/menu", filters: "restaurant_id, name, tag, available" },
    Entity { label: "Promotions", path: "/promotions", filters: "kind, active" },
    Entity { label: "Orders", path: "/orders", filters: "user_id, restaurant_id, status, start_date, end_date" },
    Entity { label: "Reviews", path: "/reviews", filters: "user_id, restaurant_id, min_rating, max_rating" },
    Entity { label: "Payments", path: "/payments", filters: "user_id, order_id, method, status" },
];

const ENTITY_ACTIONS: &[&str] = &[
    "Create",
    "List (paginated)",
    "List all",
    "Get by id",
    "Update",
    "Delete",
    "Bulk create",
    "Bulk update",
    "Bulk delete",
];

const ORDER_ACTIONS: &[&str] = &[
    "My orders",
    "Orders of a restaurant",
    "Set status",
    "Cancel",
    "Replace items",
];

const FILE_ACTIONS: &[&str] = &["Upload", "List", "Download", "Delete"];

enum ReportInput {
    None,
    UserId,
    Body(&'static str),
}

struct Report {
    path: &'static str,
    input: ReportInput,
}

const REPORTS: &[Report] = &[
    Report { path: "/aggregations/simples/countUsers", input: ReportInput::None },
    Report { path: "/aggregations/simples/distinctGenders", input: ReportInput::None },
    Report { path: "/aggregations/simples/countByCategory", input: ReportInput::None },
    Report { path: "/aggregations/simples/distinctMenuTags", input: ReportInput::None },
    Report { path: "/aggregations/simples/countDeliveredOrders", input: ReportInput::None },
    Report { path: "/aggregations/complejas/topRestaurants", input: ReportInput::None },
    Report { path: "/aggregations/complejas/salesByWeekday", input: ReportInput::None },
    Report { path: "/aggregations/complejas/avgRatingPerRestaurant", input: ReportInput::None },
    Report { path: "/aggregations/complejas/avgOrderValue", input: ReportInput::None },
    Report { path: "/aggregations/complejas/mostPopularTags", input: ReportInput::None },
    Report { path: "/aggregations/complejas/activePromotions", input: ReportInput::None },
    Report { path: "/aggregations/complejas/avgDeliveryTime", input: ReportInput::None },
    Report { path: "/aggregations/complejas/ordersPerUser", input: ReportInput::None },
    Report { path: "/aggregations/complejas/totalSalesByCategory", input: ReportInput::None },
    Report { path: "/aggregations/complejas/monthlyNewUsers", input: ReportInput::None },
    Report {
        path: "/aggregations/arrays/pushTag",
        input: ReportInput::Body(r#"{"menu_item_id": 1, "tag": "vegan"}"#),
    },
    Report {
        path: "/aggregations/arrays/pullTag",
        input: ReportInput::Body(r#"{"menu_item_id": 1, "tag": "vegan"}"#),
    },
    Report {
        path: "/aggregations/arrays/addToSet",
        input: ReportInput::Body(r#"{"promotion_id": 1, "menu_item_id": 1}"#),
    },
    Report {
        path: "/aggregations/arrays/popFirst",
        input: ReportInput::Body(r#"{"menu_item_id": 1}"#),
    },
    Report {
        path: "/aggregations/arrays/pullAll",
        input: ReportInput::Body(r#"{"menu_item_id": 1, "tags": ["a", "b"]}"#),
    },
    Report { path: "/aggregations/embedded/userOrders", input: ReportInput::UserId },
    Report {
        path: "/aggregations/embedded/addAddress",
        input: ReportInput::Body(r#"{"user_id": 1, "address": {"street": "...", "city": "..."}}"#),
    },
    Report {
        path: "/aggregations/embedded/mergeProfile",
        input: ReportInput::Body(r#"{"user_id": 1, "profile_updates": {"vegan": true}}"#),
    },
    Report { path: "/aggregations/embedded/getAddress", input: ReportInput::UserId },
    Report { path: "/aggregations/embedded/projectOrders", input: ReportInput::None },
];

fn print_value(value: &Value) {
    match value {
        Value::Null => println!("Done."),
        other => match serde_json::to_string_pretty(other) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{other}"),
        },
    }
}

/// Print the outcome of one action; errors are reported, never propagated.
pub fn report<E: std::fmt::Display>(result: Result<Value, E>) {
    match result {
        Ok(value) => print_value(&value),
        Err(e) => {
            tracing::debug!(error = %e, "Action failed");
            println!("Error: {e}");
        }
    }
}

/// Split `"a=1, b=two"` into query pairs; entries without `=` are skipped.
pub fn parse_filters(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

pub async fn login(client: &mut ApiClient, prompt: &mut Prompt) -> anyhow::Result<()> {
    let email = prompt.ask("Email").await?;
    let password = prompt.ask("Password").await?;
    match client.login(&email, &password).await {
        Ok(user) => {
            let role = user.get("role").and_then(Value::as_str).unwrap_or("?");
            println!("Logged in as {email} ({role}).");
        }
        Err(e) => println!("Error: {e}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

pub async fn entities(client: &ApiClient, prompt: &mut Prompt) -> anyhow::Result<()> {
    let labels: Vec<&str> = ENTITIES.iter().map(|e| e.label).collect();
    while let Some(i) = prompt.choose("Entities", &labels).await? {
        entity(client, prompt, &ENTITIES[i]).await?;
        if prompt.is_closed() {
            break;
        }
    }
    Ok(())
}

async fn entity(client: &ApiClient, prompt: &mut Prompt, entity: &Entity) -> anyhow::Result<()> {
    let mut actions = ENTITY_ACTIONS.to_vec();
    if entity.path == "/orders" {
        actions.extend_from_slice(ORDER_ACTIONS);
    }

    while let Some(choice) = prompt.choose(entity.label, &actions).await? {
        if let Err(e) = entity_action(client, prompt, entity, actions[choice]).await {
            println!("Error: {e:#}");
        }
        if prompt.is_closed() {
            break;
        }
    }
    Ok(())
}

async fn entity_action(
    client: &ApiClient,
    prompt: &mut Prompt,
    entity: &Entity,
    action: &str,
) -> anyhow::Result<()> {
    let base = entity.path;
    match action {
        "Create" => {
            let body = prompt.json("Record").await?;
            report(client.post(base, &body).await);
        }
        "List (paginated)" => {
            let mut query = Vec::new();
            for key in ["page", "limit", "sort_by", "order", "fields"] {
                if let Some(value) = prompt.ask_optional(key).await? {
                    query.push((key.to_string(), value));
                }
            }
            let filters = prompt
                .ask(&format!("Filters as key=value, comma-separated ({})", entity.filters))
                .await?;
            query.extend(parse_filters(&filters));
            report(client.get(base, &query).await);
        }
        "List all" => report(client.get(&format!("{base}/all"), &[]).await),
        "Get by id" => {
            let id = prompt.id("Id").await?;
            let query: Vec<(String, String)> = prompt
                .ask_optional("fields")
                .await?
                .map(|f| vec![("fields".to_string(), f)])
                .unwrap_or_default();
            report(client.get(&format!("{base}/{id}"), &query).await);
        }
        "Update" => {
            let id = prompt.id("Id").await?;
            let body = prompt.json("Changes").await?;
            report(client.put(&format!("{base}/{id}"), Some(&body)).await);
        }
        "Delete" => {
            let id = prompt.id("Id").await?;
            report(client.delete(&format!("{base}/{id}"), None).await);
        }
        "Bulk create" => {
            let body = prompt.json("Array of records").await?;
            report(client.post(&format!("{base}/bulk"), &body).await);
        }
        "Bulk update" => {
            let hint = if entity.path == "/users" {
                r#"[{"email": "...", "changes": {...}}]"#
            } else if entity.path == "/orders" {
                r#"[{"id": 1, "status": "confirmed"}]"#
            } else {
                r#"[{"id": 1, "changes": {...}}]"#
            };
            println!("Shape: {hint}");
            let body = prompt.json("Updates").await?;
            report(client.put(&format!("{base}/bulk/update"), Some(&body)).await);
        }
        "Bulk delete" => {
            let hint = if entity.path == "/users" {
                r#"{"ids": [1, 2], "emails": ["..."]}"#
            } else {
                r#"{"ids": [1, 2]}"#
            };
            println!("Shape: {hint}");
            let body = prompt.json("Selection").await?;
            report(client.delete(&format!("{base}/bulk/delete"), Some(&body)).await);
        }
        "My orders" => {
            let query = match prompt.ask_optional("status").await? {
                Some(status) => vec![("status".to_string(), status)],
                None => Vec::new(),
            };
            report(client.get("/orders/my-orders", &query).await);
        }
        "Orders of a restaurant" => {
            let id = prompt.id("Restaurant id").await?;
            report(client.get(&format!("/orders/restaurant/{id}"), &[]).await);
        }
        "Set status" => {
            let id = prompt.id("Order id").await?;
            let status = prompt.ask("New status").await?;
            let body = json!({ "status": status });
            report(client.put(&format!("/orders/{id}/status"), Some(&body)).await);
        }
        "Cancel" => {
            let id = prompt.id("Order id").await?;
            report(client.put(&format!("/orders/{id}/cancel"), None).await);
        }
        "Replace items" => {
            let id = prompt.id("Order id").await?;
            println!(r#"Shape: {{"items": [{{"menu_item_id": 1, "quantity": 2}}]}}"#);
            let body = prompt.json("Items").await?;
            report(client.put(&format!("/orders/{id}/items"), Some(&body)).await);
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub async fn files(client: &ApiClient, prompt: &mut Prompt) -> anyhow::Result<()> {
    while let Some(choice) = prompt.choose("Files", FILE_ACTIONS).await? {
        if let Err(e) = file_action(client, prompt, FILE_ACTIONS[choice]).await {
            println!("Error: {e:#}");
        }
        if prompt.is_closed() {
            break;
        }
    }
    Ok(())
}

async fn file_action(client: &ApiClient, prompt: &mut Prompt, action: &str) -> anyhow::Result<()> {
    match action {
        "Upload" => {
            let path = PathBuf::from(prompt.ask("Local path").await?);
            report(client.upload(&path).await);
        }
        "List" => report(client.get("/files", &[]).await),
        "Download" => {
            let filename = prompt.ask("Stored filename").await?;
            let dest = prompt
                .ask_optional("Save as (empty = same name)")
                .await?
                .unwrap_or_else(|| filename.clone());
            match client.download(&filename, &PathBuf::from(&dest)).await {
                Ok(bytes) => println!("Saved {bytes} bytes to {dest}."),
                Err(e) => println!("Error: {e}"),
            }
        }
        "Delete" => {
            let filename = prompt.ask("Stored filename").await?;
            report(client.delete_file(&filename).await);
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

pub async fn aggregations(client: &ApiClient, prompt: &mut Prompt) -> anyhow::Result<()> {
    let labels: Vec<&str> = REPORTS
        .iter()
        .map(|r| r.path.trim_start_matches("/aggregations/"))
        .collect();
    while let Some(i) = prompt.choose("Aggregations", &labels).await? {
        if let Err(e) = run_report(client, prompt, &REPORTS[i]).await {
            println!("Error: {e:#}");
        }
        if prompt.is_closed() {
            break;
        }
    }
    Ok(())
}

async fn run_report(client: &ApiClient, prompt: &mut Prompt, def: &Report) -> anyhow::Result<()> {
    let outcome = match def.input {
        ReportInput::None => client.get(def.path, &[]).await,
        ReportInput::UserId => {
            let id = prompt.id("User id").await?;
            client.get(def.path, &[("user_id".to_string(), id.to_string())]).await
        }
        ReportInput::Body(example) => {
            println!("Example: {example}");
            let body = prompt.json("Body").await?;
            client.post(def.path, &body).await
        }
    };
    report(outcome);
    Ok(())
}

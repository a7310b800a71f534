use std::sync::Arc;

use assetdesk_api::app::{build_app, AppServices};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, over an in-memory store, on an ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()), &["*".to_string()]);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Create a customer with an address; returns its id.
    async fn customer(&self, name: &str) -> String {
        let (status, body) = self
            .post(
                "/customers/",
                json!({
                    "name": name,
                    "contact_email": format!("ops@{}.test", name.to_lowercase()),
                    "contact_phone": "555-0100",
                    "address": {
                        "country": "NL",
                        "city": "Utrecht",
                        "street_address": "Main 1",
                        "postal_code": "3511"
                    }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn sites_of(&self, customer_id: &str) -> Vec<Value> {
        let (status, body) = self.get(&format!("/sites/?customer_id={customer_id}")).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn customer_with_address_gets_a_main_site() {
    let server = TestServer::spawn().await;
    let id = server.customer("Acme").await;

    let sites = server.sites_of(&id).await;
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["name"], "Acme - Main Site");
    assert_eq!(sites[0]["is_primary"], true);
    assert_eq!(sites[0]["customer_id"], id.as_str());

    let (status, customer) = server.get(&format!("/customers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["id"], id.as_str());
    assert_eq!(customer["name"], "Acme");
}

#[tokio::test]
async fn registering_the_same_customer_twice_returns_the_original() {
    let server = TestServer::spawn().await;
    let first = server.customer("Acme").await;
    let second = server.customer("Acme").await;
    assert_eq!(first, second);

    let (_, customers) = server.get("/customers").await;
    assert_eq!(customers.as_array().unwrap().len(), 1);
    assert_eq!(server.sites_of(&first).await.len(), 1);
}

#[tokio::test]
async fn customer_without_address_cannot_add_a_first_site() {
    let server = TestServer::spawn().await;
    let (status, body) = server
        .post(
            "/customers",
            json!({ "name": "Bare", "contact_email": "b@bare.test", "contact_phone": "1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(server.sites_of(&id).await.is_empty());

    let (status, body) = server
        .post("/sites/", json!({ "name": "HQ", "customer_id": id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "first_site_auto_created");
}

#[tokio::test]
async fn additional_sites_get_combined_unique_names() {
    let server = TestServer::spawn().await;
    let id = server.customer("Acme").await;

    let (status, site) = server
        .post("/sites", json!({ "name": "Lab", "customer_id": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(site["name"], "Acme - Lab");

    let (status, body) = server
        .post("/sites/", json!({ "name": "Lab", "customer_id": id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_name");

    let site_id = site["id"].as_str().unwrap();
    let (status, renamed) = server
        .put(&format!("/sites/{site_id}"), json!({ "name": "Annex" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Acme - Annex");
}

#[tokio::test]
async fn last_site_cannot_be_deleted() {
    let server = TestServer::spawn().await;
    let id = server.customer("Acme").await;
    let (_, lab) = server
        .post("/sites/", json!({ "name": "Lab", "customer_id": id }))
        .await;

    let (status, body) = server
        .delete(&format!("/sites/{}", lab["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Site deleted successfully");

    let main = server.sites_of(&id).await.remove(0);
    let (status, body) = server
        .delete(&format!("/sites/{}", main["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "last_site_protected");
    assert_eq!(server.sites_of(&id).await.len(), 1);
}

#[tokio::test]
async fn deleting_a_customer_removes_its_sites() {
    let server = TestServer::spawn().await;
    let id = server.customer("Acme").await;
    server
        .post("/sites/", json!({ "name": "Lab", "customer_id": id }))
        .await;
    assert_eq!(server.sites_of(&id).await.len(), 2);

    let (status, body) = server.delete(&format!("/customers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Customer and associated sites deleted successfully"
    );

    assert!(server.sites_of(&id).await.is_empty());
    let (status, body) = server.get(&format!("/customers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get("/customers/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, _) = server.get("/sites/?customer_id=nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = "0190a8c4-0000-7000-8000-000000000000";
    for path in ["customers", "sites", "infrastructure", "assets"] {
        let (status, _) = server.get(&format!("/{path}/{unknown}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        let (status, _) = server.delete(&format!("/{path}/{unknown}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/customers/"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn customer_update_merges_fields() {
    let server = TestServer::spawn().await;
    let id = server.customer("Acme").await;

    let (status, body) = server
        .put(&format!("/customers/{id}"), json!({ "contact_phone": "555-0199" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contact_phone"], "555-0199");
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["address"]["city"], "Utrecht");
}

#[tokio::test]
async fn on_premise_location_needs_an_owned_site() {
    let server = TestServer::spawn().await;
    let acme = server.customer("Acme").await;
    let globex = server.customer("Globex").await;
    let globex_site = server.sites_of(&globex).await[0]["id"].clone();

    let (status, body) = server
        .post(
            "/infrastructure/",
            json!({
                "name": "Server room",
                "type": "on_premise",
                "customer_id": acme,
                "config": { "location": "Basement" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "site_id");

    let (status, body) = server
        .post(
            "/infrastructure/",
            json!({
                "name": "Server room",
                "type": "on_premise",
                "customer_id": acme,
                "site_id": globex_site,
                "config": { "location": "Basement" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ownership_mismatch");
}

#[tokio::test]
async fn location_config_must_match_its_type() {
    let server = TestServer::spawn().await;
    let acme = server.customer("Acme").await;

    let (status, body) = server
        .post(
            "/infrastructure",
            json!({
                "name": "Prod",
                "type": "aws",
                "customer_id": acme,
                "config": { "subscription_id": "s", "resource_group": "rg", "region": "westeurope" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "type_mismatch");
    assert_eq!(body["field"], "config");
}

#[tokio::test]
async fn assets_are_placed_and_listed() {
    let server = TestServer::spawn().await;
    let acme = server.customer("Acme").await;
    let site = server.sites_of(&acme).await[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, location) = server
        .post(
            "/infrastructure/",
            json!({
                "name": "Prod",
                "type": "azure",
                "customer_id": acme,
                "config": { "subscription_id": "s", "resource_group": "rg", "region": "westeurope" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{location}");
    let location_id = location["id"].as_str().unwrap().to_string();
    assert_eq!(location["is_active"], true);

    let (status, body) = server
        .post(
            "/assets",
            json!({
                "hostname": "web-01",
                "ip_address": "10.0.0.5",
                "asset_type": "vm",
                "customer_id": acme,
                "specs": { "cpu_cores": 4, "ram_gb": 16, "os": "Ubuntu", "os_version": "24.04" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "specs");

    let (status, vm) = server
        .post(
            "/assets",
            json!({
                "hostname": "web-01",
                "ip_address": "10.0.0.5",
                "asset_type": "vm",
                "customer_id": acme,
                "specs": {
                    "cpu_cores": 4,
                    "ram_gb": 16,
                    "os": "Ubuntu",
                    "os_version": "24.04",
                    "infrastructure_location_id": location_id
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{vm}");

    let (status, body) = server
        .post(
            "/assets/",
            json!({
                "hostname": "sw-01",
                "ip_address": "10.0.0.1",
                "asset_type": "switch",
                "customer_id": acme,
                "specs": { "manufacturer": "Cisco", "model": "C9300" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_site");

    let (status, switch) = server
        .post(
            "/assets/",
            json!({
                "hostname": "sw-01",
                "ip_address": "10.0.0.1",
                "asset_type": "switch",
                "customer_id": acme,
                "site_id": site,
                "specs": { "manufacturer": "Cisco", "model": "C9300" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{switch}");

    let (_, vms) = server.get(&format!("/infrastructure/{location_id}/vms")).await;
    let vms = vms.as_array().unwrap();
    assert_eq!(vms.len(), 1);
    assert_eq!(vms[0]["id"], vm["id"]);

    let (_, at_site) = server.get(&format!("/assets/site/{site}")).await;
    assert_eq!(at_site.as_array().unwrap().len(), 1);
    assert_eq!(at_site[0]["hostname"], "sw-01");

    let (_, switches) = server
        .get(&format!("/assets?customer_id={acme}&asset_type=switch"))
        .await;
    assert_eq!(switches.as_array().unwrap().len(), 1);

    let (_, azure) = server.get("/infrastructure/?location_type=azure").await;
    assert_eq!(azure.as_array().unwrap().len(), 1);
    let (status, _) = server.get("/infrastructure/?location_type=gcp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn infrastructure_list_filters_are_combined() {
    let server = TestServer::spawn().await;
    let acme = server.customer("Acme").await;
    let globex = server.customer("Globex").await;
    let acme_site = server.sites_of(&acme).await[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, server_room) = server
        .post(
            "/infrastructure/",
            json!({
                "name": "Server room",
                "type": "on_premise",
                "customer_id": acme,
                "site_id": acme_site,
                "config": { "location": "Basement" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{server_room}");

    let (status, vpc) = server
        .post(
            "/infrastructure/",
            json!({
                "name": "Prod VPC",
                "type": "aws",
                "customer_id": globex,
                "config": { "region": "eu-west-1", "vpc_id": "vpc-123" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{vpc}");

    let (_, by_site) = server
        .get(&format!("/infrastructure/?site_id={acme_site}"))
        .await;
    let by_site = by_site.as_array().unwrap();
    assert_eq!(by_site.len(), 1);
    assert_eq!(by_site[0]["id"], server_room["id"]);

    let (_, by_customer) = server
        .get(&format!("/infrastructure?customer_id={globex}"))
        .await;
    let by_customer = by_customer.as_array().unwrap();
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0]["id"], vpc["id"]);

    let (_, mismatched) = server
        .get(&format!("/infrastructure/?customer_id={globex}&site_id={acme_site}"))
        .await;
    assert!(mismatched.as_array().unwrap().is_empty());

    let (_, matched) = server
        .get(&format!(
            "/infrastructure/?customer_id={acme}&site_id={acme_site}&location_type=on_premise"
        ))
        .await;
    assert_eq!(matched.as_array().unwrap().len(), 1);

    let (_, all) = server.get("/infrastructure/").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn asset_update_is_revalidated() {
    let server = TestServer::spawn().await;
    let acme = server.customer("Acme").await;
    let site = server.sites_of(&acme).await[0]["id"].clone();

    let (status, host) = server
        .post(
            "/assets",
            json!({
                "hostname": "esx-01",
                "ip_address": "10.0.0.10",
                "asset_type": "host",
                "customer_id": acme,
                "site_id": site,
                "specs": { "manufacturer": "Dell", "cpu_cores": 32, "ram_gb": 256 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{host}");
    let path = format!("/assets/{}", host["id"].as_str().unwrap());

    let (status, updated) = server.put(&path, json!({ "notes": "rack 4" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "rack 4");
    assert_eq!(updated["hostname"], "esx-01");

    let (status, body) = server.put(&path, json!({ "ip_address": "999.1.1.1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "ip_address");

    let (status, body) = server.delete(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset deleted successfully");
}

#[tokio::test]
async fn vms_of_unknown_location_is_not_found() {
    let server = TestServer::spawn().await;
    let (status, _) = server
        .get("/infrastructure/0190a8c4-0000-7000-8000-000000000000/vms")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

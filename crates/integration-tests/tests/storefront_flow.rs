//! End-to-end storefront flow: resolve session, log in, browse and filter
//! the catalog, fill the cart, and file a proof of delivery.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use doorstep_core::ProductId;
use doorstep_integration_tests::{
    CannedResponse, RecordingSink, ScriptedCamera, StubApi, test_config,
};
use doorstep_storefront::navigation::{AuthScreen, MainScreen, NavError, NavState, ScreenGraph};
use doorstep_storefront::services::proof::PodForm;
use doorstep_storefront::session::MemoryTokenStore;
use doorstep_storefront::state::AppState;

fn catalog_json() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "image": "https://cdn.example.com/1.jpg",
            "category": "men's clothing"
        },
        {
            "id": 2,
            "title": "Slim Fit T-Shirt",
            "price": 22.3,
            "image": "https://cdn.example.com/2.jpg",
            "category": "men's clothing"
        },
        {
            "id": 3,
            "title": "Gold Chain Bracelet",
            "price": 695.0,
            "image": "https://cdn.example.com/3.jpg",
            "category": "jewelery"
        }
    ])
}

async fn stub_store() -> StubApi {
    StubApi::spawn(vec![
        CannedResponse::get("/products", 200, catalog_json()),
        CannedResponse::get(
            "/products/categories",
            200,
            json!(["men's clothing", "jewelery"]),
        ),
        CannedResponse::post("/auth/login", 200, json!({ "accessToken": "issued-token" })),
    ])
    .await
}

#[tokio::test]
async fn full_session_catalog_cart_and_proof_flow() {
    let api = stub_store().await;
    let state = AppState::with_token_store(
        test_config(&api.base_url()),
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("build state");

    // Cold start: no token, so the login flow is live.
    let nav = state.navigation().start().await;
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Unauthenticated(AuthScreen::Login))
    );

    // The authenticated flow is unreachable until login succeeds.
    let err = state
        .navigation()
        .navigate(ScreenGraph::Authenticated(MainScreen::Home))
        .await
        .expect_err("home must be unreachable while logged out");
    assert_eq!(err, NavError::Unreachable);

    // Log in; the navigation event after it swaps the whole graph.
    state
        .auth()
        .login("kminchelle", "0lelplR")
        .await
        .expect("login");
    let nav = state.navigation().refresh().await;
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Authenticated(MainScreen::Home))
    );

    // Home mount: load products and categories.
    state.load_catalog().await.expect("load catalog");
    state.load_categories().await.expect("load categories");

    {
        let catalog = state.catalog();
        assert_eq!(catalog.products().len(), 3);
        assert_eq!(catalog.categories(), ["men's clothing", "jewelery"]);
        // floor(22.3) / ceil(695.0)
        assert_eq!(catalog.bounds().min, Decimal::new(22, 0));
        assert_eq!(catalog.bounds().max, Decimal::new(695, 0));
        // Fresh load shows everything.
        assert_eq!(catalog.filtered().len(), 3);
    }

    // Filter by category, then narrow the price window.
    {
        let mut catalog = state.catalog();
        catalog.set_category("men's clothing");
        assert_eq!(catalog.filtered().len(), 2);

        catalog.set_price_range(Decimal::new(22, 0), Decimal::new(100, 0));
        let visible = catalog.filtered();
        assert_eq!(visible.len(), 1);
        assert_eq!(
            visible.first().expect("one visible product").title,
            "Slim Fit T-Shirt"
        );

        catalog.set_category("");
        catalog.set_price_range(Decimal::new(22, 0), Decimal::new(695, 0));
    }

    // Fill the cart from the catalog view.
    let (backpack, shirt) = {
        let catalog = state.catalog();
        let products = catalog.products();
        (
            products.first().expect("backpack").clone(),
            products.get(1).expect("shirt").clone(),
        )
    };
    assert_eq!(backpack.id, ProductId::new(1));

    {
        let mut cart = state.cart();
        cart.add(&backpack);
        cart.add(&backpack);
        cart.add(&shirt);

        // Badge shows distinct lines, not total quantity.
        assert_eq!(cart.line_count(), 2);
        // 109.95 * 2 + 22.3
        assert_eq!(cart.total(), Decimal::new(2422, 1));

        cart.set_quantity(shirt.id, 0);
        assert_eq!(cart.quantity_of(shirt.id), Some(1));

        cart.remove(backpack.id);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total(), Decimal::new(223, 1));
    }

    // Proof of delivery from the drawer.
    let nav = state
        .navigation()
        .navigate(ScreenGraph::Authenticated(MainScreen::ProofOfDelivery))
        .await
        .expect("navigate to proof of delivery");
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Authenticated(MainScreen::ProofOfDelivery))
    );

    let camera = ScriptedCamera::Grants("file:///photos/delivery.jpg");
    let sink = RecordingSink::new();
    let mut form = PodForm::new();
    form.take_photo(&camera).await.expect("capture photo");
    form.set_rating(5);
    form.set_feedback("left with the neighbor");

    let record = form.submit(&sink).await.expect("submit proof");
    assert_eq!(record.image_uri, "file:///photos/delivery.jpg");
    assert_eq!(sink.records().len(), 1);
    // Form is ready for the next delivery.
    assert!(form.image_uri().is_none());

    // Logout drops straight back to the login flow.
    state.auth().logout().await.expect("logout");
    let nav = state.navigation().refresh().await;
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Unauthenticated(AuthScreen::Login))
    );
}

#[tokio::test]
async fn authenticated_flag_survives_noop_navigation() {
    let api = stub_store().await;
    let state = AppState::with_token_store(
        test_config(&api.base_url()),
        Arc::new(MemoryTokenStore::with_token("persisted")),
    )
    .expect("build state");

    let nav = state.navigation().start().await;
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Authenticated(MainScreen::Home))
    );

    // A no-op navigation event re-checks the token and keeps the flow.
    let nav = state
        .navigation()
        .navigate(ScreenGraph::Authenticated(MainScreen::Home))
        .await
        .expect("noop navigation");
    assert_eq!(
        nav,
        NavState::Ready(ScreenGraph::Authenticated(MainScreen::Home))
    );
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn camera_denial_blocks_only_the_capture() {
    let mut form = PodForm::new();
    form.set_rating(4);

    let err = form
        .take_photo(&ScriptedCamera::Denies)
        .await
        .expect_err("capture must be blocked");
    assert_eq!(
        err,
        doorstep_storefront::services::proof::CaptureError::PermissionDenied
    );

    // The rest of the form still works.
    assert_eq!(form.rating(), 4);
    form.take_photo(&ScriptedCamera::Grants("file:///p.jpg"))
        .await
        .expect("second attempt succeeds");
    assert!(form.image_uri().is_some());
}

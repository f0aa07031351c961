use schema_router_rs::{
    Action, Configure, HttpMethod, Params, Router, RouterError, RouterOptions,
};
use serde_json::json;
use std::sync::Arc;

fn noop() -> Action {
    Action::handler(|_| Ok(json!(null)))
}

#[test]
fn url_when_optional_segment_params_vary_then_segment_follows_its_last_param() {
    let router = Router::new(None);
    router
        .hidden("/api[/v{v}?/{vv}]", "api")
        .expect("hidden route should register");

    let url = |params: Params| router.url("api", params).expect("url should build");
    assert_eq!(url(Params::new()), "/api");
    assert_eq!(url(Params::new().with("v", 2)), "/api");
    assert_eq!(url(Params::new().with("vv", 1)), "/api/v/1");
    assert_eq!(url(Params::new().with("v", 2).with("vv", 1)), "/api/v2/1");
}

#[test]
fn url_when_required_param_has_default_and_validator_then_both_apply() {
    let router = Router::new(None);
    router
        .hidden("/user/{id:1|[0-9]+}", "user")
        .expect("hidden route should register");

    assert_eq!(
        router.url("user", Params::new()).expect("default applies"),
        "/user/1"
    );
    assert_eq!(
        router
            .url("user", Params::new().with("id", 2))
            .expect("value applies"),
        "/user/2"
    );
    match router.url("user", Params::new().with("id", "test")) {
        Err(RouterError::ParamValidationFailed { name, value, .. }) => {
            assert_eq!(name, "id");
            assert_eq!(value, "test");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn url_when_required_param_missing_then_error_names_param_and_schema() {
    let router = Router::new(None);
    router
        .hidden("/user/{id}", "user")
        .expect("hidden route should register");

    match router.url("user", Params::new()) {
        Err(RouterError::MissingRequiredParameter { name, route }) => {
            assert_eq!(name, "id");
            assert_eq!(route, "/user/{id}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn url_when_path_is_empty_then_root_slash_is_returned() {
    let router = Router::new(None);
    router.hidden("", "home").expect("hidden route should register");

    assert_eq!(router.url("home", Params::new()).expect("url builds"), "/");

    router.set_host("example.com").expect("host should set");
    assert_eq!(
        router.url("home", Params::new()).expect("url builds"),
        "http://example.com/"
    );
}

#[test]
fn url_when_path_contains_a_scheme_then_host_still_gets_one() {
    let router = Router::new(None);
    router
        .get("/go/{to|*}", noop(), Some("go"))
        .expect("route should register");
    router.set_host("example.com").expect("host should set");

    assert_eq!(
        router
            .url("go", Params::new().with("to", "http://x"))
            .expect("url builds"),
        "http://example.com/go/http://x"
    );
}

#[test]
fn url_when_host_carries_a_scheme_then_it_is_kept() {
    let router = Router::new(None);
    router
        .hidden("/feed", "feed")
        .expect("hidden route should register");
    router
        .set_host("ftp://files.example.com")
        .expect("host should set");

    assert_eq!(
        router.url("feed", Params::new()).expect("url builds"),
        "ftp://files.example.com/feed"
    );
}

#[test]
fn url_when_params_are_left_over_then_they_form_the_query() {
    let router = Router::new(None);
    router
        .hidden("/user/{id}", "user")
        .expect("hidden route should register");

    let params = Params::new()
        .with("id", 1)
        .with("foo", "bar")
        .with("empty", "")
        .with("none", json!(null));
    assert_eq!(
        router.url("user", params).expect("url builds"),
        "/user/1?foo=bar"
    );
}

#[test]
fn url_when_append_query_disabled_then_left_over_params_are_dropped() {
    let options = RouterOptions::builder()
        .append_query(false)
        .build()
        .expect("options should build");
    let router = Router::new(Some(options));
    router
        .hidden("/user/{id}", "user")
        .expect("hidden route should register");

    let params = Params::new().with("id", 1).with("foo", "bar");
    assert_eq!(router.url("user", params).expect("url builds"), "/user/1");
}

#[test]
fn url_when_name_is_dotted_then_group_prefixes_are_followed() {
    let router = Router::new(None);
    router
        .group("/api", Some("api."), |api| {
            api.group("/v3", Some("v3."), |v3| {
                v3.get("/clients", noop(), Some("clients"))?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("groups should register");

    let id = router.find("api.v3.clients").expect("route should be found");
    assert_eq!(router.route_name(id).as_deref(), Some("clients"));
    assert_eq!(router.schema(id).as_deref(), Some("/clients"));
    assert_eq!(
        router.url("api.v3.clients", Params::new()).expect("url builds"),
        "/api/v3/clients"
    );
    assert!(router.find("clients").is_none());
    match router.url("api.clients", Params::new()) {
        Err(RouterError::RouteNameNotFound { name }) => assert_eq!(name, "api.clients"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn url_when_group_declares_params_then_they_are_filled_before_route_params() {
    let router = Router::new(None);
    router
        .group("/{lang:en}", Some("site."), |site| {
            site.get("/post/{id#uint}", noop(), Some("post"))?;
            Ok(())
        })
        .expect("group should register");

    assert_eq!(
        router
            .url("site.post", Params::new().with("lang", "fr").with("id", 3))
            .expect("url builds"),
        "/fr/post/3"
    );
    assert_eq!(
        router
            .url("site.post", Params::new().with("id", 3))
            .expect("url builds"),
        "/en/post/3"
    );
}

#[test]
fn url_when_host_has_params_then_host_consumes_them() {
    let options = RouterOptions::builder()
        .secure(true)
        .build()
        .expect("options should build");
    let router = Router::new(Some(options));
    router
        .group("/dashboard", Some("tenant."), |tenant| {
            tenant.set_host("{tenant}.example.com");
            tenant.hidden("/home", "home")?;
            Ok(())
        })
        .expect("group should register");

    let params = Params::new().with("tenant", "acme").with("tab", "news");
    assert_eq!(
        router.url("tenant.home", params).expect("url builds"),
        "https://acme.example.com/dashboard/home?tab=news"
    );
}

#[test]
fn url_absolute_when_no_host_on_chain_then_default_host_is_used() {
    let options = RouterOptions::builder()
        .default_host("//cdn.example.com")
        .build()
        .expect("options should build");
    let router = Router::new(Some(options));
    router
        .hidden("/asset/{file}", "asset")
        .expect("hidden route should register");

    let params = Params::new().with("file", "app.js");
    assert_eq!(
        router.url("asset", params.clone()).expect("relative url builds"),
        "/asset/app.js"
    );
    assert_eq!(
        router.url_absolute("asset", params).expect("absolute url builds"),
        "http://cdn.example.com/asset/app.js"
    );

    let bare = Router::new(None);
    bare.hidden("/x", "x").expect("hidden route should register");
    match bare.url_absolute("x", Params::new()) {
        Err(RouterError::MissingHost { name }) => assert_eq!(name, "x"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn url_when_output_binder_registered_then_domain_values_are_flattened() {
    let router = Router::new(None);
    router
        .bind(
            "user",
            |value| Ok(json!({ "id": value })),
            |user| Ok(user["id"].clone()),
        )
        .expect("binder should register");
    router
        .get("/u/{user#uint}", noop(), Some("profile"))
        .expect("route should register");

    let user = json!({ "id": 9 });
    let url = router
        .url("profile", Params::new().with("user", user.clone()))
        .expect("url builds");
    assert_eq!(url, "/u/9");

    let (_, matched) = router
        .find_match(&url, Some(HttpMethod::Get))
        .expect("generated url should match");
    assert_eq!(matched.param("user"), Some(&user));
}

#[test]
fn url_when_param_absent_then_output_binder_sees_remaining_params() {
    let router = Router::new(None);
    router
        .routes(|root| {
            root.hidden("/post/{slug}", "post")?.bind_out("slug", |params| {
                Ok(params["title"]
                    .as_str()
                    .map(|title| json!(title.to_lowercase()))
                    .unwrap_or(json!(null)))
            });
            Ok(())
        })
        .expect("route should register");

    assert_eq!(
        router
            .url("post", Params::new().with("title", "Hello"))
            .expect("url builds"),
        "/post/hello?title=Hello"
    );
    assert!(matches!(
        router.url("post", Params::new()),
        Err(RouterError::MissingRequiredParameter { .. })
    ));
}

#[test]
fn url_when_generated_then_matching_returns_the_same_params() {
    let router = Router::new(None);
    router
        .get("/shop/{category}/{id#uint}[/{variant#int}]", noop(), Some("item"))
        .expect("route should register");

    let params = Params::new()
        .with("category", "books")
        .with("id", 12)
        .with("variant", -2);
    let url = router.url("item", params.clone()).expect("url builds");
    assert_eq!(url, "/shop/books/12/-2");

    let (_, matched) = router
        .find_match(&url, Some(HttpMethod::Get))
        .expect("generated url should match");
    assert_eq!(matched.clean_params(), &params);
}

#[test]
fn url_when_called_from_an_action_then_read_lock_is_shared() {
    let router = Arc::new(Router::new(None));
    router
        .hidden("/target/{id}", "target")
        .expect("hidden route should register");

    let inner = Arc::downgrade(&router);
    router
        .any(
            "/go/{id}",
            Action::handler(move |ctx| {
                let router = inner.upgrade().ok_or("router dropped")?;
                let id = ctx.param("id").cloned().unwrap_or_default();
                Ok(json!(router.url("target", Params::new().with("id", id))?))
            }),
            None,
        )
        .expect("route should register");

    assert_eq!(
        router.dispatch("/go/5", None).expect("action runs"),
        json!("/target/5")
    );
}

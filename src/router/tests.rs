use std::sync::Arc;

use http::Method;

use super::Router;
use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::error::RouteError;
use crate::message::{Request, Response};
use crate::resolver::{Callback, RegistryResolver};
use crate::routable::Routable;
use crate::route::RouteArguments;

fn ok_handler() -> Callback {
    Callback::handler(|_req, res, _args| res)
}

#[test]
fn test_identifiers_start_at_zero_and_increase() {
    let mut router = Router::new();
    let a = router.get("/a", ok_handler()).unwrap().identifier();
    let b = router.get("/b", ok_handler()).unwrap().identifier();
    let c = router.get("/c", ok_handler()).unwrap().identifier();
    assert_eq!((a, b, c), (0, 1, 2));
}

#[test]
fn test_identifiers_not_reused_after_removal() {
    let mut router = Router::new();
    router.get("/a", ok_handler()).unwrap().set_name("a");
    router.get("/b", ok_handler()).unwrap();
    assert!(router.remove_route_by_name("a"));
    assert!(!router.remove_route_by_name("a"));
    let next = router.get("/c", ok_handler()).unwrap().identifier();
    assert_eq!(next, 2);
    assert!(router.route_by_identifier(0).is_none());
    assert_eq!(router.routes().count(), 2);
}

#[test]
fn test_method_names_are_normalised() {
    let mut router = Router::new();
    let route = router.map(["get", "Post", "GET"], "/x", ok_handler()).unwrap();
    assert_eq!(route.methods(), &[Method::GET, Method::POST]);
}

#[test]
fn test_invalid_method_is_rejected() {
    let mut router = Router::new();
    let err = router.map(["GE T"], "/x", ok_handler()).unwrap_err();
    assert!(matches!(err, RouteError::InvalidMethod { ref method } if method == "GE T"));
    assert_eq!(router.routes().count(), 0);
}

#[test]
fn test_route_by_name_first_registered_wins() {
    let mut router = Router::new();
    assert!(router.route_by_name("dup").is_none());
    router.get("/first", ok_handler()).unwrap().set_name("dup");
    router.get("/second", ok_handler()).unwrap().set_name("dup");
    assert_eq!(router.route_by_name("dup").unwrap().pattern(), "/first");
    assert!(router.route_by_name("other").is_none());
}

#[test]
fn test_push_pop_group_prefixes_routes() {
    let mut router = Router::new();
    router.push_group("/api", Callback::group(|_r, _g, _b| Ok(())));
    router.push_group("/v1", Callback::group(|_r, _g, _b| Ok(())));
    let pattern = router.get("/users", ok_handler()).unwrap().pattern().to_string();
    assert_eq!(pattern, "/api/v1/users");

    assert_eq!(router.pop_group().unwrap().pattern(), "/v1");
    assert_eq!(router.pop_group().unwrap().pattern(), "/api");
    assert!(router.pop_group().is_none());

    let pattern = router.get("/users", ok_handler()).unwrap().pattern().to_string();
    assert_eq!(pattern, "/users");
}

#[test]
fn test_group_pops_even_when_body_fails() {
    let mut router = Router::new();
    let err = router
        .group(
            "/broken",
            Callback::group(|router, _g, _b| {
                router.map(["NOT A METHOD"], "/x", Callback::named("X::y"))?;
                Ok(())
            }),
        )
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidMethod { .. }));
    assert!(router.active_groups().is_empty());
}

#[test]
fn test_router_resolver_reaches_groups_and_routes() {
    let mut registry = RegistryResolver::new();
    registry
        .register(
            "Api::routes",
            Callback::group(|router, _g, _b| {
                router.get("/ping", "Api::ping")?;
                Ok(())
            }),
        )
        .register(
            "Api::ping",
            Callback::handler(|_req, res, _args| res.with_body(serde_json::json!("pong"))),
        );

    let mut router = Router::new();
    router.set_callback_resolver(Arc::new(registry));
    router.group("/api", "Api::routes").unwrap();

    let res = router
        .handle(&Request::new(Method::GET, "/api/ping"), Response::default())
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!("pong"));
}

#[test]
fn test_dispatch_normalises_leading_slash() {
    let mut router = Router::new();
    router.get("/users/{id}", ok_handler()).unwrap();
    let with = router.dispatch(&Request::new(Method::GET, "/users/42")).unwrap();
    let without = router.dispatch(&Request::new(Method::GET, "users/42")).unwrap();
    assert_eq!(with, without);
    assert!(with.is_found());
}

#[test]
fn test_dispatcher_is_built_once() {
    let mut router = Router::new();
    router.get("/a", ok_handler()).unwrap();
    assert!(router.dispatcher().is_none());

    let first = router.create_dispatcher().unwrap();
    let second = router.create_dispatcher().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // stale until reset
    router.get("/b", ok_handler()).unwrap();
    let stale = router.dispatch(&Request::new(Method::GET, "/b")).unwrap();
    assert_eq!(stale, DispatchResult::NotFound);

    assert!(router.reset_dispatcher().is_some());
    let fresh = router.dispatch(&Request::new(Method::GET, "/b")).unwrap();
    assert!(fresh.is_found());
}

struct FixedDispatcher;

impl Dispatcher for FixedDispatcher {
    fn dispatch(&self, _method: &Method, _path: &str) -> DispatchResult {
        DispatchResult::Found {
            identifier: 0,
            arguments: RouteArguments::from([("id".to_string(), "fixed".to_string())]),
        }
    }
}

#[test]
fn test_injected_dispatcher_is_used() {
    let mut router = Router::new();
    router
        .get(
            "/anything",
            Callback::handler(|_req, res, args| {
                res.with_body(serde_json::json!({ "id": args.get("id") }))
            }),
        )
        .unwrap();
    router.set_dispatcher(Arc::new(FixedDispatcher));

    let res = router
        .handle(&Request::new(Method::DELETE, "/nowhere"), Response::default())
        .unwrap();
    assert_eq!(res.body, serde_json::json!({ "id": "fixed" }));
}

#[test]
fn test_handle_not_found_and_method_not_allowed() {
    let mut router = Router::new();
    router.get("/users/{id}", ok_handler()).unwrap();
    router.put("/users/{id}", ok_handler()).unwrap();

    let res = router
        .handle(&Request::new(Method::GET, "/missing"), Response::default())
        .unwrap();
    assert_eq!(res.status, 404);

    let res = router
        .handle(&Request::new(Method::POST, "/users/1"), Response::default())
        .unwrap();
    assert_eq!(res.status, 405);
    assert_eq!(res.header("allow"), Some("GET, PUT"));
}

#[test]
fn test_handle_after_removal_without_reset_is_not_found() {
    let mut router = Router::new();
    router.get("/gone", ok_handler()).unwrap().set_name("gone");
    router.create_dispatcher().unwrap();
    router.remove_route_by_name("gone");

    let res = router
        .handle(&Request::new(Method::GET, "/gone"), Response::default())
        .unwrap();
    assert_eq!(res.status, 404);
}

#[test]
fn test_route_handler_propagates_to_new_routes() {
    let mut router = Router::new();
    router.set_route_handler(Arc::new(crate::route::RecoveringRouteHandler));
    router
        .get(
            "/boom",
            Callback::handler(|_req, _res, _args| -> Response { panic!("boom") }),
        )
        .unwrap();

    let res = router
        .handle(&Request::new(Method::GET, "/boom"), Response::default())
        .unwrap();
    assert_eq!(res.status, 500);
}

#[test]
fn test_set_cache_file_validation() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = Router::new();

    let target = dir.path().join("routes.json");
    router.set_cache_file(&target).unwrap();
    let expected = std::fs::canonicalize(dir.path()).unwrap().join("routes.json");
    assert_eq!(router.cache_file(), Some(expected.as_path()));

    let err = router
        .set_cache_file(dir.path().join("missing").join("routes.json"))
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidCacheTarget { .. }));

    // a directory is not a regular file
    let err = router.set_cache_file(dir.path()).unwrap_err();
    assert!(matches!(err, RouteError::InvalidCacheTarget { .. }));

    router.set_cache_file("").unwrap();
    assert!(router.cache_file().is_none());
}

#[test]
fn test_cache_file_path_is_resolved() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let mut router = Router::new();
    router
        .set_cache_file(dir.path().join("sub").join("..").join("routes.json"))
        .unwrap();
    let expected = std::fs::canonicalize(dir.path()).unwrap().join("routes.json");
    assert_eq!(router.cache_file(), Some(expected.as_path()));

    let err = router
        .set_cache_file(dir.path().join("sub").join(".."))
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidCacheTarget { .. }));
}

#[cfg(target_os = "linux")]
#[test]
fn test_cache_directory_that_refuses_writes_is_rejected() {
    // procfs refuses file creation regardless of uid
    let mut router = Router::new();
    let err = router.set_cache_file("/proc/routekit-routes.json").unwrap_err();
    assert!(matches!(err, RouteError::InvalidCacheTarget { .. }));
    assert!(router.cache_file().is_none());
}

#[cfg(unix)]
#[test]
fn test_cache_directory_check_follows_actual_access() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // root may still write into a 0555 directory; everyone else may not
    let writable = std::fs::File::create(locked.join("check")).is_ok();
    if writable {
        std::fs::remove_file(locked.join("check")).unwrap();
    }

    let mut router = Router::new();
    let result = router.set_cache_file(locked.join("routes.json")).map(|_| ());
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    match result {
        Ok(()) => assert!(writable),
        Err(RouteError::InvalidCacheTarget { .. }) => assert!(!writable),
        Err(other) => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_group_restores_stack_when_body_leaves_groups_pushed() {
    let mut router = Router::new();
    router.push_group("/outer", Callback::named("outer"));
    router
        .group(
            "/api",
            Callback::group(|router, _group, _binding| {
                router.push_group("/leaked", Callback::named("leaked"));
                router.get("/inside", Callback::handler(|_req, res, _args| res))?;
                Ok(())
            }),
        )
        .unwrap();

    let patterns: Vec<&str> = router.active_groups().iter().map(|g| g.pattern()).collect();
    assert_eq!(patterns, vec!["/outer"]);

    let route = router.get("/after", ok_handler()).unwrap();
    assert_eq!(route.pattern(), "/outer/after");
    assert_eq!(
        router.route_by_identifier(0).unwrap().pattern(),
        "/outer/api/leaked/inside"
    );
}

#[test]
fn test_empty_cache_file_builds_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("routes.json");

    let mut router = Router::new();
    router.get("/a", ok_handler()).unwrap();
    router.set_cache_file(&target).unwrap();
    router.set_cache_file("").unwrap();
    router.create_dispatcher().unwrap();

    assert!(!target.exists());
}

#[test]
fn test_dump_routes_lines() {
    let mut router = Router::new();
    router.map(["GET", "HEAD"], "/users/{id}", "Users::show").unwrap().set_name("users.show");
    router.post("/users", ok_handler()).unwrap();

    let lines = router.dump_routes();
    assert_eq!(
        lines,
        vec![
            "[route] #0 GET|HEAD /users/{id} -> 'Users::show' (users.show)".to_string(),
            "[route] #1 POST /users -> <route handler>".to_string(),
        ]
    );
}

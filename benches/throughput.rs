use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use routekit::manifest::RouteManifest;
use routekit::{Callback, Request, Response, Router};

fn example_manifest() -> &'static str {
    r#"
routes:
  - pattern: /
    handler: Root::index
  - methods: [GET, POST]
    pattern: /zoo/animals
    handler: Animals::collection
  - methods: [GET, PUT, PATCH, DELETE]
    pattern: /zoo/animals/{id}
    handler: Animals::item
  - pattern: /zoo/animals/{id}/toys/{toy_id}
    handler: Animals::toy
  - pattern: /zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}
    handler: Habitats::section
  - methods: [POST]
    pattern: /inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}
    handler: Inventory::batch
  - pattern: /complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}
    handler: Complex::many
groups:
  - pattern: /zoo/health
    routes:
      - methods: [HEAD, OPTIONS]
        pattern: /live
        handler: Health::live
"#
}

fn bench_dispatch_throughput(c: &mut Criterion) {
    let router = RouteManifest::from_yaml(example_manifest())
        .and_then(|m| Ok(m.build_router()?))
        .expect("valid manifest");
    router.create_dispatcher().expect("dispatcher builds");

    let requests: Vec<Request> = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
        (Method::OPTIONS, "/zoo/health/live"),
    ]
    .into_iter()
    .map(|(method, path)| Request::new(method, path))
    .collect();

    c.bench_function("dispatch", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(router.dispatch(request).ok());
            }
        })
    });
}

fn bench_handle_with_group_middleware(c: &mut Criterion) {
    let mut router = Router::new();
    router
        .group(
            "/api",
            Callback::group(|router, _group, _binding| {
                router.get(
                    "/users/{id}",
                    Callback::handler(|_req, res, args| {
                        res.with_body(serde_json::json!({ "id": args.get("id") }))
                    }),
                )?;
                Ok(())
            }),
        )
        .expect("group registers")
        .add_middleware(std::sync::Arc::new(routekit::middleware::MetricsMiddleware::new()));

    let request = Request::new(Method::GET, "/api/users/42");
    c.bench_function("handle_with_group_middleware", |b| {
        b.iter(|| black_box(router.handle(&request, Response::default()).ok()))
    });
}

criterion_group!(benches, bench_dispatch_throughput, bench_handle_with_group_middleware);
criterion_main!(benches);

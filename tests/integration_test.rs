//! Integration tests for hmvc-dispatch
//!
//! These tests drive whole dispatch chains the way a host application does:
//! building applications, registering handlers and issuing nested requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use hmvc_dispatch::prelude::*;
use parking_lot::Mutex;

// =============================================================================
// Test Handlers
// =============================================================================

/// Records what the handler observed while it ran.
#[derive(Debug, Default, Clone)]
struct Observed {
    depth: usize,
    app: String,
    views: Vec<PathBuf>,
    config_paths: Vec<PathBuf>,
    lang_paths: Vec<PathBuf>,
    args: Vec<String>,
}

#[derive(Debug, Default)]
struct Recorder {
    seen: Mutex<Vec<Observed>>,
}

impl Recorder {
    fn observed(&self) -> Vec<Observed> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Handler for Recorder {
    async fn handle(
        &self,
        route: &Route,
        args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        self.seen.lock().push(Observed {
            depth: chain.depth(),
            app: chain.current::<Application>().name().to_string(),
            views: chain.current::<ViewFinder>().paths(),
            config_paths: chain.current::<Config>().paths(),
            lang_paths: chain.current::<Language>().paths(),
            args,
        });
        Ok(Response::ok(route.uri.clone()))
    }
}

/// Dispatches `target` as a nested request and wraps the inner body.
#[derive(Debug)]
struct Forward {
    target: &'static str,
}

#[async_trait]
impl Handler for Forward {
    async fn handle(
        &self,
        _route: &Route,
        _args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        let request = chain.request(self.target)?;
        let inner = chain.execute(request).await?;
        let body = inner.response().map(|r| r.body.clone()).unwrap_or_default();
        Ok(Response::ok(format!("[{body}]")))
    }
}

/// Dispatches into another application.
#[derive(Debug)]
struct CrossApp {
    module: Arc<Application>,
}

#[async_trait]
impl Handler for CrossApp {
    async fn handle(
        &self,
        _route: &Route,
        _args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        let input = Input::new(Method::Get).with_parent(chain.current::<Input>());
        let request = Request::new(
            RequestKind::Local,
            self.module.clone(),
            "/report",
            Arc::new(input),
        );
        let inner = chain.execute(request).await?;

        let after = chain.current::<Application>().name().to_string();
        let body = inner.response().map(|r| r.body.clone()).unwrap_or_default();
        Ok(Response::ok(format!("{body} then {after}")))
    }
}

/// Never completes.
#[derive(Debug)]
struct Stall;

#[async_trait]
impl Handler for Stall {
    async fn handle(
        &self,
        _route: &Route,
        _args: Vec<String>,
        _chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        std::future::pending::<()>().await;
        Ok(Response::ok("unreachable"))
    }
}

/// Yields to the scheduler before checking the chain it runs in.
#[derive(Debug)]
struct Yielding;

#[async_trait]
impl Handler for Yielding {
    async fn handle(
        &self,
        route: &Route,
        _args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            let top = chain.stack().top().map(|c| c.resource().to_string());
            if chain.depth() != 1 || top.as_deref() != Some(route.uri.as_str()) {
                return Err(FrameworkError::Internal("chain state leaked".to_string()).into());
            }
        }
        Ok(Response::ok(route.uri.clone()))
    }
}

fn failing(err: fn() -> HandlerError) -> Arc<dyn Handler> {
    handler_fn("failing", move |_route, _args| Err(err()))
}

fn identifier(route: &Route) -> Option<&str> {
    route.controller.as_ref().and_then(|c| c.identifier())
}

// =============================================================================
// Route Resolution Scenarios
// =============================================================================

fn task_kernel(recorder: Arc<Recorder>) -> Kernel {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Task\\Blog\\Show", recorder);
        })
        .build();
    Kernel::new(app).cli()
}

#[tokio::test]
async fn test_exact_match_has_no_leftovers() {
    let recorder = Arc::new(Recorder::default());
    let request = task_kernel(recorder.clone())
        .dispatch("/blog/show")
        .await
        .unwrap();

    let route = request.route().unwrap();
    assert_eq!(identifier(route), Some("Task\\Blog\\Show"));
    assert!(route.segments.is_empty());
    assert!(route.action.is_none());
    assert_eq!(request.response().unwrap().body, "/blog/show");
    assert!(recorder.observed()[0].args.is_empty());
}

#[tokio::test]
async fn test_single_leftover_is_a_segment() {
    let recorder = Arc::new(Recorder::default());
    let request = task_kernel(recorder.clone())
        .dispatch("/blog/show/42")
        .await
        .unwrap();

    let route = request.route().unwrap();
    assert_eq!(identifier(route), Some("Task\\Blog\\Show"));
    assert_eq!(route.segments, vec!["42"]);
    assert!(route.action.is_none());
    assert_eq!(recorder.observed()[0].args, vec!["42"]);
}

#[tokio::test]
async fn test_several_leftovers_promote_an_action() {
    let recorder = Arc::new(Recorder::default());
    let request = task_kernel(recorder.clone())
        .dispatch("/blog/show/edit/42")
        .await
        .unwrap();

    let route = request.route().unwrap();
    assert_eq!(route.action.as_deref(), Some("Edit"));
    assert_eq!(route.segments, vec!["42"]);
    assert_eq!(recorder.observed()[0].args, vec!["42"]);
}

#[tokio::test]
async fn test_no_match_is_not_found() {
    let kernel = task_kernel(Arc::new(Recorder::default()));
    let chain = kernel.chain();

    let request = chain.request("/shop/cart").unwrap();
    let err = chain.execute(request).await.unwrap_err();

    assert!(matches!(err, DispatchError::NotFound(_)));
    assert_eq!(chain.depth(), 0);
}

#[tokio::test]
async fn test_cli_kernel_marks_tasks_with_cli_method() {
    let recorder = Arc::new(Recorder::default());
    let request = task_kernel(recorder.clone())
        .dispatch("/blog/show")
        .await
        .unwrap();

    assert_eq!(request.method(), &Method::Cli);
    assert_eq!(request.route().unwrap().method, Method::Cli);
}

#[tokio::test]
async fn test_request_kind_selects_identifier_infix() {
    let app = Arc::new(
        Application::builder("main")
            .namespace(NamespaceEntry::new("", "/app"))
            .with_handlers(|handlers| {
                handlers.register_handler(
                    "Task\\Blog\\Show",
                    handler_fn("task", |_route, _args| Ok(Response::ok("task"))),
                );
                handlers.register_handler(
                    "Controller\\Blog\\Show",
                    handler_fn("controller", |_route, _args| Ok(Response::ok("controller"))),
                );
            })
            .build(),
    );

    let local = Kernel::new(app.clone()).dispatch("/blog/show").await.unwrap();
    assert_eq!(identifier(local.route().unwrap()), Some("Controller\\Blog\\Show"));
    assert_eq!(local.route().unwrap().method, Method::Get);
    assert_eq!(local.response().unwrap().body, "controller");

    let task = Kernel::new(app).cli().dispatch("/blog/show").await.unwrap();
    assert_eq!(identifier(task.route().unwrap()), Some("Task\\Blog\\Show"));
    assert_eq!(task.response().unwrap().body, "task");
}

#[tokio::test]
async fn test_local_requests_do_not_see_tasks() {
    let recorder = Arc::new(Recorder::default());
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Task\\Blog\\Show", recorder.clone());
        })
        .build();

    let err = Kernel::new(app).dispatch("/blog/show").await.unwrap_err();

    assert!(matches!(err, DispatchError::NotFound(_)));
    assert!(recorder.observed().is_empty());
}

#[tokio::test]
async fn test_registration_order_breaks_ties() {
    let recorder = Arc::new(Recorder::default());
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/app"))
        .namespace(NamespaceEntry::new("/blog", "/srv/blog").with_root("Blog"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Blog", recorder.clone());
            handlers.register_handler("Blog\\Controller\\Show", recorder.clone());
        })
        .build();

    let request = Kernel::new(app).dispatch("/blog/show").await.unwrap();
    let route = request.route().unwrap();

    assert_eq!(identifier(route), Some("Controller\\Blog"));
    assert_eq!(route.namespace.as_deref(), Some(""));
    assert_eq!(route.segments, vec!["show"]);
}

#[tokio::test]
async fn test_router_alias_and_named_parameters() {
    let recorder = Arc::new(Recorder::default());
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/app"))
        .router(
            TableRouter::new()
                .alias("/", "/welcome")
                .alias_with_params("/post", "/blog/show", [("id", "7")]),
        )
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Welcome", recorder.clone());
            handlers.register_handler("Controller\\Blog\\Show", recorder.clone());
        })
        .build();
    let kernel = Kernel::new(app);

    let welcome = kernel.dispatch("/").await.unwrap();
    assert_eq!(
        identifier(welcome.route().unwrap()),
        Some("Controller\\Welcome")
    );

    let post = kernel.dispatch("/post").await.unwrap();
    assert_eq!(post.param("id"), Some("7"));
    assert_eq!(recorder.observed()[1].args, vec!["7"]);
}

#[tokio::test]
async fn test_callable_translation_skips_namespaces() {
    let app = Application::builder("main")
        .router(TableRouter::new().callable(
            "/ping",
            handler_fn("ping", |_route, _args| Ok(Response::ok("pong"))),
        ))
        .build();

    let request = Kernel::new(app).dispatch("/ping").await.unwrap();

    assert_eq!(request.response().unwrap().body, "pong");
    assert_eq!(request.route().unwrap().translation.to_string(), "Closure");
    assert!(request.route().unwrap().path.is_none());
}

#[tokio::test]
async fn test_factory_failure_is_not_found() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/app"))
        .with_handlers(|handlers| {
            handlers.register_fn("Controller\\Broken", |_app| {
                Err(FrameworkError::Internal("no database".to_string()))
            });
        })
        .build();
    let kernel = Kernel::new(app);
    let chain = kernel.chain();

    let err = chain
        .execute(chain.request("/broken").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::NotFound(msg) if msg.contains("Controller\\Broken")));
    assert_eq!(chain.depth(), 0);
    assert!(kernel.root().views().paths().is_empty());
}

// =============================================================================
// Nested Dispatch
// =============================================================================

fn nested_kernel(recorder: Arc<Recorder>) -> Kernel {
    let app = Application::builder("main")
        .namespace(
            NamespaceEntry::new("/admin", "/srv/admin")
                .with_root("Admin")
                .non_routeable(),
        )
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Admin\\Controller\\Users", recorder.clone());
            handlers.register_handler("Controller\\Widget", recorder.clone());
            handlers.register_handler(
                "Controller\\Dashboard",
                Arc::new(Forward {
                    target: "/admin/users",
                }),
            );
            handlers.register_handler(
                "Controller\\Page",
                Arc::new(Forward { target: "widget/7" }),
            );
        })
        .build();
    Kernel::new(app)
}

#[tokio::test]
async fn test_non_routeable_namespace_blocks_outer_dispatch() {
    let kernel = nested_kernel(Arc::new(Recorder::default()));

    let err = kernel.dispatch("/admin/users").await.unwrap_err();
    assert!(matches!(err, DispatchError::NotFound(_)));
}

#[tokio::test]
async fn test_nested_dispatch_reaches_non_routeable_namespace() {
    let recorder = Arc::new(Recorder::default());
    let kernel = nested_kernel(recorder.clone());

    let request = kernel.dispatch("/dashboard").await.unwrap();

    assert_eq!(request.response().unwrap().body, "[/admin/users]");
    let observed = recorder.observed();
    assert_eq!(observed[0].depth, 2);
    assert_eq!(
        observed[0].views,
        vec![PathBuf::from("/srv/app"), PathBuf::from("/srv/admin")]
    );
}

#[tokio::test]
async fn test_nested_dispatch_stacks_paths_and_restores_them() {
    let recorder = Arc::new(Recorder::default());
    let kernel = nested_kernel(recorder.clone());

    let request = kernel.dispatch("/page").await.unwrap();
    assert_eq!(request.response().unwrap().body, "[/widget/7]");

    let inner = &recorder.observed()[0];
    assert_eq!(inner.args, vec!["7"]);
    assert_eq!(
        inner.views,
        vec![PathBuf::from("/srv/app"), PathBuf::from("/srv/app")]
    );
    assert_eq!(
        inner.lang_paths,
        vec![
            PathBuf::from("/srv/app/lang/en"),
            PathBuf::from("/srv/app/lang/en")
        ]
    );

    let root = kernel.root();
    assert!(root.views().paths().is_empty());
    assert!(root.config().paths().is_empty());
    assert!(root.language().paths().is_empty());
}

#[tokio::test]
async fn test_nested_input_chains_to_outer_input() {
    #[derive(Debug)]
    struct Inspect;

    #[async_trait]
    impl Handler for Inspect {
        async fn handle(
            &self,
            _route: &Route,
            _args: Vec<String>,
            chain: &DispatchChain,
        ) -> HandlerResult<Response> {
            let input = chain.current::<Input>();
            let inherited = input.param("lang").unwrap_or("none").to_string();
            Ok(Response::ok(format!("{} {inherited}", input.method())))
        }
    }

    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Inspect", Arc::new(Inspect));
            handlers.register_handler(
                "Controller\\Outer",
                Arc::new(Forward { target: "/inspect" }),
            );
        })
        .build();
    let chain = Kernel::new(app).chain();

    let request = chain
        .request_with("/outer", Input::new(Method::Post).with_param("lang", "nl"))
        .unwrap();
    let request = chain.execute(request).await.unwrap();

    assert_eq!(request.response().unwrap().body, "[POST nl]");
}

#[tokio::test]
async fn test_nested_dispatch_into_another_application() {
    let module_recorder = Arc::new(Recorder::default());
    let module = Arc::new(
        Application::builder("reports")
            .namespace(NamespaceEntry::new("", "/srv/reports"))
            .config(Config::new().with_value("lang.fallback", "de"))
            .with_handlers(|handlers| {
                handlers.register_handler("Controller\\Report", module_recorder.clone());
            })
            .build(),
    );
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Home",
                Arc::new(CrossApp {
                    module: module.clone(),
                }),
            );
        })
        .build();

    let request = Kernel::new(app).dispatch("/home").await.unwrap();

    assert_eq!(request.response().unwrap().body, "/report then main");
    let inner = &module_recorder.observed()[0];
    assert_eq!(inner.app, "reports");
    assert_eq!(inner.views, vec![PathBuf::from("/srv/reports")]);
    assert_eq!(
        inner.config_paths,
        vec![Path::new("/srv/reports").join("config")]
    );
    assert_eq!(
        inner.lang_paths,
        vec![Path::new("/srv/reports").join("lang").join("de")]
    );
    assert!(module.views().paths().is_empty());
}

// =============================================================================
// Failure Handling
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("disk on fire")]
struct DiskOnFire;

#[tokio::test]
async fn test_unrecognized_failure_is_reraised_after_unwind() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Upload", failing(|| HandlerError::other(DiskOnFire)));
        })
        .build();
    let kernel = Kernel::new(app);
    let chain = kernel.chain();

    let err = chain
        .execute(chain.request("/upload").unwrap())
        .await
        .unwrap_err();

    match err {
        DispatchError::Unrecognized(source) => {
            assert!(source.downcast_ref::<DiskOnFire>().is_some());
        }
        other => panic!("expected unrecognized failure, got {other:?}"),
    }
    assert_eq!(chain.depth(), 0);
    assert!(kernel.root().views().paths().is_empty());
    assert!(kernel.root().config().paths().is_empty());
}

#[tokio::test]
async fn test_framework_failure_becomes_response() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Secret",
                failing(|| FrameworkError::Forbidden("members only".to_string()).into()),
            );
        })
        .build();
    let kernel = Kernel::new(app);

    let request = kernel.dispatch("/secret").await.unwrap();
    let response = request.response().unwrap();

    assert_eq!(response.status, 403);
    assert_eq!(response.body, "members only");
    assert!(!response.is_success());
    assert!(kernel.root().views().paths().is_empty());
}

#[tokio::test]
async fn test_custom_error_responder() {
    #[derive(Debug)]
    struct Strict;

    impl ErrorResponder for Strict {
        fn error_response(&self, err: FrameworkError) -> DispatchResult<Response> {
            match err {
                FrameworkError::NotFound(msg) => Err(DispatchError::NotFound(msg)),
                other => Ok(Response::new(other.status(), "rendered error page")
                    .with_header("content-type", "text/html")),
            }
        }
    }

    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Missing",
                failing(|| FrameworkError::NotFound("no such post".to_string()).into()),
            );
            handlers.register_handler(
                "Controller\\Invalid",
                failing(|| FrameworkError::BadRequest("bad id".to_string()).into()),
            );
        })
        .build();
    let kernel = Kernel::new(app).with_error_responder(Strict);

    let invalid = kernel.dispatch("/invalid").await.unwrap();
    let response = invalid.response().unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.headers.get("content-type").map(String::as_str), Some("text/html"));

    let chain = kernel.chain();
    let err = chain
        .execute(chain.request("/missing").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NotFound(msg) if msg == "no such post"));
    assert_eq!(chain.depth(), 0);
}

#[tokio::test]
async fn test_nested_failure_propagates_through_outer_handler() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Outer",
                Arc::new(Forward { target: "/inner" }),
            );
            handlers.register_handler(
                "Controller\\Inner",
                failing(|| HandlerError::other(DiskOnFire)),
            );
        })
        .build();
    let kernel = Kernel::new(app);
    let chain = kernel.chain();

    let err = chain
        .execute(chain.request("/outer").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(&err, DispatchError::Unrecognized(source) if source.to_string() == "disk on fire"));
    assert_eq!(chain.depth(), 0);
    assert!(kernel.root().views().paths().is_empty());
}

#[tokio::test]
async fn test_nested_not_found_becomes_error_response() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Outer",
                Arc::new(Forward { target: "/nowhere" }),
            );
        })
        .build();

    let request = Kernel::new(app).dispatch("/outer").await.unwrap();

    assert_eq!(request.response().unwrap().status, 404);
}

#[tokio::test]
async fn test_unsupported_external_request() {
    let kernel = Kernel::new(Application::builder("main").build());

    let err = kernel.dispatch("https://elsewhere.org/feed").await.unwrap_err();
    assert!(matches!(err, DispatchError::UnsupportedRequest(_)));
}

// =============================================================================
// Cancellation and Concurrency
// =============================================================================

#[tokio::test]
async fn test_cancelled_dispatch_unwinds() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Slow", Arc::new(Stall));
        })
        .build();
    let kernel = Kernel::new(app);
    let chain = kernel.chain();

    let request = chain.request("/slow").unwrap();
    let outcome = tokio::time::timeout(Duration::from_millis(20), chain.execute(request)).await;

    assert!(outcome.is_err());
    assert_eq!(chain.depth(), 0);
    assert!(kernel.root().views().paths().is_empty());
    assert!(kernel.root().config().paths().is_empty());
    assert!(kernel.root().language().paths().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_chains_run_concurrently() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Work", Arc::new(Yielding));
        })
        .build();
    let kernel = Kernel::new(app);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let kernel = kernel.clone();
            tokio::spawn(async move { kernel.dispatch(&format!("/work/{i}")).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let request = task.await.unwrap().unwrap();
        let response = request.response().unwrap();
        assert_eq!(response.status, 200, "chain {i} saw another chain's state");
        assert_eq!(response.body, format!("/work/{i}"));
    }
}

// =============================================================================
// Lifecycle Events
// =============================================================================

async fn states_of(events: EventStream) -> Vec<(DispatchState, usize)> {
    events.map(|e| (e.state, e.depth)).collect().await
}

#[tokio::test]
async fn test_lifecycle_event_sequence() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Hello",
                handler_fn("hello", |_route, _args| Ok(Response::ok("hi"))),
            );
        })
        .build();
    let (sender, events) = create_stream(DEFAULT_EVENT_BUFFER);
    let chain = Kernel::new(app).chain().with_events(sender);

    chain.execute(chain.request("/hello").unwrap()).await.unwrap();
    drop(chain);

    assert_eq!(
        states_of(events).await,
        vec![
            (DispatchState::Created, 0),
            (DispatchState::ContextPushed, 1),
            (DispatchState::RouteResolved, 1),
            (DispatchState::PathsExtended, 1),
            (DispatchState::HandlerInvoked, 1),
            (DispatchState::PathsRestored, 1),
            (DispatchState::ContextPopped, 0),
            (DispatchState::Done, 0),
        ]
    );
}

#[tokio::test]
async fn test_not_found_events_skip_paths() {
    let (sender, events) = create_stream(DEFAULT_EVENT_BUFFER);
    let chain = Kernel::new(Application::builder("main").build())
        .chain()
        .with_events(sender);

    let request = chain.request("/nothing").unwrap();
    assert!(chain.execute(request).await.is_err());
    drop(chain);

    assert_eq!(
        states_of(events).await,
        vec![
            (DispatchState::Created, 0),
            (DispatchState::ContextPushed, 1),
            (DispatchState::ErrorCaught, 1),
            (DispatchState::ContextPopped, 0),
        ]
    );
}

#[tokio::test]
async fn test_closed_event_stream_does_not_affect_dispatch() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler(
                "Controller\\Hello",
                handler_fn("hello", |_route, _args| Ok(Response::ok("hi"))),
            );
        })
        .build();
    let (sender, events) = create_stream(1);
    let chain = Kernel::new(app).chain().with_events(sender);
    drop(events);

    let request = chain.execute(chain.request("/hello").unwrap()).await.unwrap();

    assert_eq!(request.response().unwrap().body, "hi");
    assert_eq!(chain.depth(), 0);
}

#[tokio::test]
async fn test_handler_failure_events_restore_before_pop() {
    let app = Application::builder("main")
        .namespace(NamespaceEntry::new("", "/srv/app"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Fail", failing(|| HandlerError::other(DiskOnFire)));
        })
        .build();
    let (sender, events) = create_stream(DEFAULT_EVENT_BUFFER);
    let chain = Kernel::new(app).chain().with_events(sender);

    assert!(chain.execute(chain.request("/fail").unwrap()).await.is_err());
    drop(chain);

    let states: Vec<DispatchState> = states_of(events).await.into_iter().map(|(s, _)| s).collect();
    assert_eq!(
        &states[3..],
        &[
            DispatchState::PathsExtended,
            DispatchState::HandlerInvoked,
            DispatchState::ErrorCaught,
            DispatchState::PathsRestored,
            DispatchState::ContextPopped,
        ]
    );
}

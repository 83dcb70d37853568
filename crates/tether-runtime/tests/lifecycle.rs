//! End-to-end module lifecycle tests.
//!
//! Drives a full host — real bus and registries, recording collaborator
//! mocks — through load / dispose / reload cycles and checks that every
//! tracked side effect is reversed, in registration order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use tether_runtime::prelude::*;

type Log = Arc<Mutex<Vec<String>>>;

fn log_entry(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

// -- recording collaborators ----------------------------------------------

/// Timer mock: schedules nothing, logs every cancel.
struct RecordingTimers {
    next_id: AtomicU64,
    log: Log,
}

impl RecordingTimers {
    fn new(log: Log) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            log,
        }
    }

    fn next(&self) -> TimerId {
        TimerId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl TimerService for RecordingTimers {
    fn set_interval(&self, _period: Duration, _f: IntervalFn) -> TimerId {
        self.next()
    }
    fn clear_interval(&self, id: TimerId) {
        log_entry(&self.log, format!("clear-interval:{id}"));
    }
    fn set_timeout(&self, _delay: Duration, _f: OneShotFn) -> TimerId {
        self.next()
    }
    fn clear_timeout(&self, id: TimerId) {
        log_entry(&self.log, format!("clear-timeout:{id}"));
    }
    fn set_immediate(&self, _f: OneShotFn) -> TimerId {
        self.next()
    }
    fn clear_immediate(&self, id: TimerId) {
        log_entry(&self.log, format!("clear-immediate:{id}"));
    }
}

/// Network mock: tracks mounted route/connection names, logs unmounts.
struct RecordingNetwork {
    mounted: Arc<Mutex<Vec<String>>>,
    log: Log,
}

impl NetworkService for RecordingNetwork {
    fn register_route(&self, route: RouteSpec) -> Disposable {
        self.mounted.lock().unwrap().push(route.name.clone());
        let mounted = Arc::clone(&self.mounted);
        let log = Arc::clone(&self.log);
        let name = route.name;
        Box::new(move || {
            mounted.lock().unwrap().retain(|n| n != &name);
            log.lock().unwrap().push(format!("unmount-route:{name}"));
        })
    }

    fn register_connection(&self, connection: ConnectionSpec) -> Disposable {
        self.mounted.lock().unwrap().push(connection.name.clone());
        let mounted = Arc::clone(&self.mounted);
        let log = Arc::clone(&self.log);
        let name = connection.name;
        Box::new(move || {
            mounted.lock().unwrap().retain(|n| n != &name);
            log.lock().unwrap().push(format!("unmount-connection:{name}"));
        })
    }
}

/// Injection mock: logs removals.
struct RecordingInjector {
    log: Log,
}

impl InjectService for RecordingInjector {
    fn inject(&self, target: &str, _payload: Value) -> Disposable {
        let log = Arc::clone(&self.log);
        let target = target.to_string();
        Box::new(move || log.lock().unwrap().push(format!("eject:{target}")))
    }
}

// -- fixtures ---------------------------------------------------------------

struct PingScript;

#[async_trait]
impl Script for PingScript {
    async fn run(&self, _args: Value, report: Report) -> anyhow::Result<bool> {
        report("pong");
        Ok(true)
    }
}

fn ping_descriptor() -> ScriptDescriptor {
    ScriptDescriptor::new(
        "liveness probe",
        Arc::new(|args: &Value| {
            if args.is_object() || args.is_null() {
                Ok(())
            } else {
                Err("expected an object".to_string())
            }
        }),
        Arc::new(PingScript),
    )
}

struct StatusRoute;

#[async_trait]
impl RouteHandler for StatusRoute {
    async fn handle(&self, _request: Value) -> anyhow::Result<Value> {
        Ok(json!({ "ok": true }))
    }
}

struct Harness {
    host: Arc<Host>,
    teardown_log: Log,
    mounted: Arc<Mutex<Vec<String>>>,
}

fn harness() -> Harness {
    let teardown_log: Log = Arc::new(Mutex::new(Vec::new()));
    let mounted = Arc::new(Mutex::new(Vec::new()));
    let host = Host::builder()
        .timers(Arc::new(RecordingTimers::new(Arc::clone(&teardown_log))))
        .network(Arc::new(RecordingNetwork {
            mounted: Arc::clone(&mounted),
            log: Arc::clone(&teardown_log),
        }))
        .injector(Arc::new(RecordingInjector {
            log: Arc::clone(&teardown_log),
        }))
        .build();
    Harness {
        host,
        teardown_log,
        mounted,
    }
}

/// Registers one of everything the context grants.
struct KitchenSink;

impl Module for KitchenSink {
    fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        ctx.on("record/change", Arc::new(|_| {}));
        ctx.add_script("ping", ping_descriptor())?;
        ctx.provide("oauth", "github", Arc::new(42_u32))?;
        ctx.set_interval(Duration::from_secs(30), Box::new(|| {}));
        ctx.route(RouteSpec::new("status", "/status", Arc::new(StatusRoute)))?;
        ctx.inject("nav", json!({ "label": "Status" }))?;
        Ok(())
    }
}

// -- tests ------------------------------------------------------------------

#[test]
fn exhaustive_teardown_after_dispose() {
    let h = harness();
    let mut runtime = Runtime::new(ModuleId::new("mods/kitchen-sink"), Arc::clone(&h.host));

    runtime.load(&KitchenSink).unwrap();
    assert_eq!(h.host.bus().handler_count("record/change"), 1);
    assert!(h.host.scripts().read().unwrap().contains("ping"));
    assert!(h.host.providers().read().unwrap().contains("oauth", "github"));
    assert_eq!(*h.mounted.lock().unwrap(), vec!["status".to_string()]);
    assert_eq!(runtime.ledger().len(), 6);

    runtime.dispose();
    assert!(runtime.ledger().is_empty());
    assert_eq!(h.host.bus().handler_count("record/change"), 0);
    assert!(!h.host.scripts().read().unwrap().contains("ping"));
    assert!(h.host.providers().read().unwrap().is_empty());
    assert!(h.mounted.lock().unwrap().is_empty());
}

#[test]
fn disposal_order_matches_registration_order() {
    struct Ordered {
        log: Log,
    }

    impl Module for Ordered {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.set_interval(Duration::from_secs(1), Box::new(|| {}));
            ctx.route(RouteSpec::new("status", "/status", Arc::new(StatusRoute)))?;
            ctx.inject("nav", json!(null))?;
            Ok(())
        }

        fn teardown(&self) -> Option<Disposable> {
            let log = Arc::clone(&self.log);
            Some(Box::new(move || log.lock().unwrap().push("module".into())))
        }
    }

    let h = harness();
    let mut runtime = Runtime::new(ModuleId::new("mods/ordered"), Arc::clone(&h.host));
    runtime
        .load(&Ordered {
            log: Arc::clone(&h.teardown_log),
        })
        .unwrap();

    runtime.dispose();
    assert_eq!(
        *h.teardown_log.lock().unwrap(),
        vec![
            "module".to_string(),
            "clear-interval:timer-0".to_string(),
            "unmount-route:status".to_string(),
            "eject:nav".to_string(),
        ]
    );
}

#[test]
fn duplicate_script_across_runtimes() {
    struct PingModule;
    impl Module for PingModule {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.add_script("ping", ping_descriptor())?;
            Ok(())
        }
    }

    let h = harness();
    let mut first = Runtime::new(ModuleId::new("mods/first"), Arc::clone(&h.host));
    let mut second = Runtime::new(ModuleId::new("mods/second"), Arc::clone(&h.host));

    first.load(&PingModule).unwrap();

    let err = second.load(&PingModule).unwrap_err();
    let RuntimeError::EntryPoint { source, .. } = err else {
        panic!("expected EntryPoint error");
    };
    assert!(matches!(
        source.downcast_ref::<RuntimeError>(),
        Some(RuntimeError::DuplicateScript { name }) if name == "ping"
    ));
    // The first registration must be intact.
    assert_eq!(h.host.scripts().read().unwrap().len(), 1);
    assert!(h.host.scripts().read().unwrap().contains("ping"));

    // Once the holder is disposed, the name frees up.
    first.dispose();
    second.dispose();
    second.load(&PingModule).unwrap();
    assert!(h.host.scripts().read().unwrap().contains("ping"));
}

#[test]
fn reload_reregisters_script_and_cancels_timer() {
    struct PingWithHeartbeat;
    impl Module for PingWithHeartbeat {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.add_script("ping", ping_descriptor())?;
            ctx.set_interval(Duration::from_secs(10), Box::new(|| {}));
            Ok(())
        }
    }

    let h = harness();
    let mut directory = RuntimeDirectory::new(Arc::clone(&h.host));
    let id = ModuleId::new("mods/heartbeat");

    directory.get(&id).load(&PingWithHeartbeat).unwrap();
    assert!(h.host.scripts().read().unwrap().contains("ping"));

    directory.get(&id).dispose();
    assert!(!h.host.scripts().read().unwrap().contains("ping"));
    let cancels = h
        .teardown_log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.starts_with("clear-interval:"))
        .count();
    assert_eq!(cancels, 1);

    // Same runtime object loads again and re-registers the script.
    directory.get(&id).load(&PingWithHeartbeat).unwrap();
    assert!(h.host.scripts().read().unwrap().contains("ping"));
    assert_eq!(directory.len(), 1);
}

#[test]
fn absent_collaborators_degrade_to_unavailable() {
    struct Probing;
    impl Module for Probing {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            assert!(!ctx.has_network());
            assert!(!ctx.has_injector());
            // A probing module simply skips the capability.
            Ok(())
        }
    }

    struct Assuming;
    impl Module for Assuming {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.route(RouteSpec::new("status", "/status", Arc::new(StatusRoute)))?;
            Ok(())
        }
    }

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let host = Host::builder()
        .timers(Arc::new(RecordingTimers::new(log)))
        .build();

    let mut probing = Runtime::new(ModuleId::new("mods/probing"), Arc::clone(&host));
    probing.load(&Probing).unwrap();
    assert!(probing.is_loaded());

    let mut assuming = Runtime::new(ModuleId::new("mods/assuming"), Arc::clone(&host));
    let err = assuming.load(&Assuming).unwrap_err();
    let RuntimeError::EntryPoint { source, .. } = err else {
        panic!("expected EntryPoint error");
    };
    assert!(matches!(
        source.downcast_ref::<RuntimeError>(),
        Some(RuntimeError::CapabilityUnavailable { capability }) if *capability == "route"
    ));
    assert!(!assuming.is_loaded());
}

#[test]
fn once_subscription_is_cleaned_up_either_way() {
    struct OnceModule;
    impl Module for OnceModule {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.once("app/ready", Arc::new(|_| {}));
            Ok(())
        }
    }

    // Fired before disposal: the recorded off is a harmless no-op.
    let h = harness();
    let mut runtime = Runtime::new(ModuleId::new("mods/once"), Arc::clone(&h.host));
    runtime.load(&OnceModule).unwrap();
    assert_eq!(h.host.bus().emit("app/ready", &Value::Null), 1);
    assert_eq!(h.host.bus().handler_count("app/ready"), 0);
    runtime.dispose();

    // Never fired: disposal removes the pending subscription.
    runtime.load(&OnceModule).unwrap();
    assert_eq!(h.host.bus().handler_count("app/ready"), 1);
    runtime.dispose();
    assert_eq!(h.host.bus().handler_count("app/ready"), 0);
    assert_eq!(h.host.bus().emit("app/ready", &Value::Null), 0);
}

#[test]
fn runtimes_on_one_host_stay_independent() {
    struct Subscriber(&'static str);
    impl Module for Subscriber {
        fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
            ctx.on(self.0, Arc::new(|_| {}));
            Ok(())
        }
    }

    let h = harness();
    let mut first = Runtime::new(ModuleId::new("mods/first"), Arc::clone(&h.host));
    let mut second = Runtime::new(ModuleId::new("mods/second"), Arc::clone(&h.host));

    first.load(&Subscriber("alpha")).unwrap();
    second.load(&Subscriber("beta")).unwrap();

    first.dispose();
    assert_eq!(h.host.bus().handler_count("alpha"), 0);
    // Disposing the first module must not touch the second's state.
    assert_eq!(h.host.bus().handler_count("beta"), 1);
    assert!(second.is_loaded());
}

#[tokio::test]
async fn registered_script_runs_through_the_registry() {
    let h = harness();
    let mut runtime = Runtime::new(ModuleId::new("mods/kitchen-sink"), Arc::clone(&h.host));
    runtime.load(&KitchenSink).unwrap();

    let descriptor = h
        .host
        .scripts()
        .read()
        .unwrap()
        .get("ping")
        .cloned()
        .unwrap();
    (descriptor.validate)(&json!({})).unwrap();
    assert!((descriptor.validate)(&json!("bogus")).is_err());

    let reports: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let ok = descriptor
        .run
        .run(json!({}), Arc::new(move |line| log_entry(&sink, line)))
        .await
        .unwrap();
    assert!(ok);
    assert_eq!(*reports.lock().unwrap(), vec!["pong".to_string()]);
}

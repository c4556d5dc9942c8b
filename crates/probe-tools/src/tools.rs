//! The tool facade and the host round-trip every tool goes through.

use std::sync::Arc;
use std::time::Duration;

use probe_core::{BridgeConfig, BridgeError, DispatchHandle, IdentityCache};
use probe_scene::World;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::error;

use crate::{HostView, ToolError};

/// Tool entry points. Safe to call from any thread except the host's.
#[derive(Debug, Clone)]
pub struct BridgeTools {
    host: DispatchHandle<World>,
    view: HostView,
    timeout: Duration,
}

impl BridgeTools {
    #[must_use]
    pub fn new(host: DispatchHandle<World>, cache: Arc<IdentityCache>, config: &BridgeConfig) -> Self {
        Self {
            host,
            view: HostView::new(cache, config),
            timeout: config.call_timeout(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<IdentityCache> {
        self.view.cache()
    }

    pub(crate) fn host(&self) -> &DispatchHandle<World> {
        &self.host
    }

    /// Run `f` on the host tick and turn its outcome into a reply.
    pub(crate) fn on_host<F>(&self, tool: &'static str, f: F) -> Json
    where
        F: FnOnce(&mut World, &HostView) -> Result<Json, ToolError> + Send + 'static,
    {
        finish(tool, self.query(f).and_then(|result| result))
    }

    /// Run `f` on the host tick and hand back whatever it returns.
    pub(crate) fn query<R, F>(&self, f: F) -> Result<R, ToolError>
    where
        R: Send + 'static,
        F: FnOnce(&mut World, &HostView) -> R + Send + 'static,
    {
        let view = self.view.clone();
        Ok(self
            .host
            .call_blocking(move |world| f(world, &view), self.timeout)?)
    }
}

/// Serialize `payload` and mark it successful.
pub(crate) fn success(payload: impl Serialize) -> Result<Json, ToolError> {
    let mut reply = serde_json::to_value(payload).map_err(BridgeError::from)?;
    if let Json::Object(map) = &mut reply {
        map.insert("success".to_owned(), Json::Bool(true));
    }
    Ok(reply)
}

/// Collapse an outcome into the wire reply, logging failures.
pub(crate) fn finish(tool: &str, outcome: Result<Json, ToolError>) -> Json {
    match outcome {
        Ok(reply) => reply,
        Err(err) => {
            error!(tool, %err, "tool failed");
            err.to_reply()
        }
    }
}

#[cfg(test)]
mod tests {
    use probe_core::MainLoopDispatcher;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_flag_is_added() {
        let reply = success(json!({"count": 3})).unwrap();
        assert_eq!(reply, json!({"success": true, "count": 3}));
    }

    #[test]
    fn test_unanswered_call_times_out() {
        let dispatcher = MainLoopDispatcher::<World>::new();
        let config = BridgeConfig {
            call_timeout_ms: 10,
            ..BridgeConfig::default()
        };
        let tools = BridgeTools::new(dispatcher.handle(), Arc::new(IdentityCache::new()), &config);

        let reply = tools.on_host("noop", |_, _| success(json!({})));
        assert_eq!(reply, json!({"success": false, "error": "Request timeout"}));
    }

    #[test]
    fn test_host_gone_is_reported() {
        let dispatcher = MainLoopDispatcher::<World>::new();
        let tools = BridgeTools::new(
            dispatcher.handle(),
            Arc::new(IdentityCache::new()),
            &BridgeConfig::default(),
        );
        drop(dispatcher);

        let reply = tools.on_host("noop", |_, _| success(json!({})));
        assert_eq!(reply["error"], "Channel disconnected");
    }

    #[test]
    fn test_host_side_panic_is_reported_with_its_message() {
        let dispatcher = MainLoopDispatcher::<World>::new();
        let tools = BridgeTools::new(
            dispatcher.handle(),
            Arc::new(IdentityCache::new()),
            &BridgeConfig::default(),
        );

        let caller = std::thread::spawn(move || {
            tools.on_host("unity_inspect_object", |_, _| -> Result<Json, ToolError> {
                panic!("member getter blew up")
            })
        });
        let mut world = World::new();
        while !caller.is_finished() {
            dispatcher.drain(&mut world);
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(
            caller.join().unwrap(),
            json!({"success": false, "error": "member getter blew up"})
        );
    }
}

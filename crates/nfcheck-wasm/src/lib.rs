//! WASM bindings for NF-e batch reconciliation.
//!
//! The engine is meant to run inside a Web Worker: the host posts one batch
//! request, receives progress messages through a callback and gets the
//! terminal `completed` / `failed` message as the return value.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use nfcheck_core::reconcile::compress_ranges as compress;
use nfcheck_core::{EngineMessage, NfcheckConfig, ReconcileEngine};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(message: &EngineMessage) -> Result<JsValue, JsValue> {
    message
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn run_request(
    engine: &ReconcileEngine,
    request: JsValue,
    on_message: Option<js_sys::Function>,
) -> Result<JsValue, JsValue> {
    let request: serde_json::Value = match serde_wasm_bindgen::from_value(request) {
        Ok(value) => value,
        Err(e) => {
            return to_js(&EngineMessage::Failed {
                message: format!("invalid request: {}", e),
            });
        }
    };

    // The first callback or conversion error stops forwarding and is returned
    let mut terminal = None;
    let mut forward_error = None;
    engine.dispatch(&request, |message| {
        if let (Some(callback), None) = (on_message.as_ref(), forward_error.as_ref()) {
            if let Err(e) = to_js(&message).and_then(|value| callback.call1(&JsValue::NULL, &value)) {
                forward_error = Some(e);
            }
        }
        if message.is_terminal() {
            terminal = Some(message);
        }
    });

    if let Some(e) = forward_error {
        return Err(e);
    }

    match terminal {
        Some(message) => to_js(&message),
        None => to_js(&EngineMessage::Failed {
            message: "engine finished without a terminal message".to_string(),
        }),
    }
}

/// Reconcile a batch with the default configuration.
///
/// `request` is `{ documents: [{ name, content }] }`. Every outbound message,
/// progress included, is passed to `on_message` when given.
#[wasm_bindgen]
pub fn reconcile(request: JsValue, on_message: Option<js_sys::Function>) -> Result<JsValue, JsValue> {
    run_request(&ReconcileEngine::default(), request, on_message)
}

/// Compress ascending invoice numbers into `start` / `start-end` tokens.
#[wasm_bindgen(js_name = compressRanges)]
pub fn compress_ranges(numbers: Vec<f64>) -> Vec<String> {
    let numbers: Vec<i64> = numbers.into_iter().map(|n| n as i64).collect();
    compress(&numbers)
}

/// Configurable reconciler for browser use.
#[wasm_bindgen]
pub struct Reconciler {
    engine: ReconcileEngine,
}

#[wasm_bindgen]
impl Reconciler {
    /// Create a reconciler. `config` follows the `NfcheckConfig` JSON layout.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Reconciler, JsValue> {
        let config: NfcheckConfig = if config.is_undefined() || config.is_null() {
            NfcheckConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            engine: ReconcileEngine::new(config.reconcile),
        })
    }

    /// Reconcile one batch; see [`reconcile`].
    #[wasm_bindgen]
    pub fn run(&self, request: JsValue, on_message: Option<js_sys::Function>) -> Result<JsValue, JsValue> {
        run_request(&self.engine, request, on_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_compress_ranges() {
        assert_eq!(compress_ranges(vec![1.0, 2.0, 3.0, 5.0]), vec!["1-3", "5"]);
    }

    #[wasm_bindgen_test]
    fn test_malformed_request_fails() {
        let result = reconcile(JsValue::from_str("nope"), None).unwrap();
        let message: serde_json::Value = serde_wasm_bindgen::from_value(result).unwrap();
        assert_eq!(message["type"], "failed");
    }

    #[wasm_bindgen_test]
    fn test_throwing_callback_is_reported() {
        let request = serde_json::json!({ "documents": [] });
        let request = request.serialize(&Serializer::json_compatible()).unwrap();
        let callback = js_sys::Function::new_with_args("message", "throw new Error('nope')");
        assert!(reconcile(request, Some(callback)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_callback_receives_every_message() {
        let request = serde_json::json!({
            "documents": [{ "name": "a.xml", "content": "<infNFe><ide><nNF>1</nNF></ide></infNFe>" }]
        });
        let request = request.serialize(&Serializer::json_compatible()).unwrap();
        let seen = js_sys::Array::new();
        let callback = js_sys::Function::new_with_args("message", "this.push(message.type)")
            .bind(&seen);
        reconcile(request, Some(callback)).unwrap();
        assert_eq!(seen.length(), 2);
        assert_eq!(seen.get(1).as_string().as_deref(), Some("completed"));
    }

    #[wasm_bindgen_test]
    fn test_empty_batch_completes() {
        let request = serde_json::json!({ "documents": [] });
        let request = request.serialize(&Serializer::json_compatible()).unwrap();
        let result = reconcile(request, None).unwrap();
        let message: serde_json::Value = serde_wasm_bindgen::from_value(result).unwrap();
        assert_eq!(message["type"], "completed");
        assert_eq!(message["report"]["totalProcessed"], 0);
    }
}

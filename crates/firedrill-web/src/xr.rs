//! WebXR session request and browser notices
//!
//! The session is asked for at startup but only sent to the browser once the
//! user presses "Enter AR"; browsers refuse immersive sessions that do not
//! come from a user gesture.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use firedrill_core::xr::SessionMode;
use firedrill_core::{XrError, XrSessionInfo, XrSessionOptions};
use firedrill_scene::{DrillScene, NotificationMode};
use std::sync::{Arc, Mutex};

/// Session options from the scene config and how far the user got
#[derive(Resource, Debug, Clone, Default)]
pub struct XrEntry {
    options: Option<XrSessionOptions>,
    /// Marked pending in the scene, waiting for the button
    armed: bool,
    pressed: bool,
    sent: bool,
}

impl XrEntry {
    pub fn new(options: Option<XrSessionOptions>) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Whether the enter button should be on screen
    pub fn offer(&self) -> bool {
        self.armed && !self.sent
    }

    /// The user asked to enter; ignored unless the button is offered
    pub fn press(&mut self) {
        if self.offer() {
            self.pressed = true;
        }
    }

    /// Options to send, once per scene, after the button was pressed
    fn take_request(&mut self) -> Option<XrSessionOptions> {
        if !self.pressed || self.sent {
            return None;
        }
        self.sent = true;
        self.options.clone()
    }
}

/// Shared queue for XR answers arriving from the browser
#[derive(Resource, Clone, Default)]
pub struct PendingXrResults(pub Arc<Mutex<Vec<Result<XrSessionInfo, XrError>>>>);

pub struct WebXrPlugin {
    pub options: Option<XrSessionOptions>,
}

impl Plugin for WebXrPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(XrEntry::new(self.options.clone()))
            .init_resource::<PendingXrResults>()
            .add_systems(Startup, arm_immersive_session)
            .add_systems(
                Update,
                ((send_immersive_request, complete_immersive_session).chain(), show_alerts),
            )
            .add_systems(EguiPrimaryContextPass, enter_xr_button);
    }
}

pub fn button_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::ImmersiveAr => "Enter AR",
        SessionMode::ImmersiveVr => "Enter VR",
        SessionMode::Inline => "Enter XR",
    }
}

/// Record the request at startup; the render loop keeps going meanwhile
fn arm_immersive_session(mut entry: ResMut<XrEntry>, mut drill: ResMut<DrillScene>) {
    let Some(options) = entry.options.clone() else {
        return;
    };
    let DrillScene { ctx, composer } = &mut *drill;
    entry.armed = composer.begin_immersive_session(ctx, &options);
}

fn enter_xr_button(mut contexts: EguiContexts, mut entry: ResMut<XrEntry>) {
    if !entry.offer() {
        return;
    }
    let Some(mode) = entry.options.as_ref().map(|o| o.session_mode) else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let mut pressed = false;
    egui::Area::new(egui::Id::new("enter_xr"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .show(ctx, |ui| {
            let button = egui::Button::new(egui::RichText::new(button_label(mode)).size(18.0));
            pressed = ui.add(button).clicked();
        });

    if pressed {
        entry.press();
    }
}

/// Hand the request to the browser in the frame after the click, while the
/// page still has user activation
fn send_immersive_request(mut entry: ResMut<XrEntry>, pending: Res<PendingXrResults>) {
    let Some(options) = entry.take_request() else {
        return;
    };

    let pending_clone = pending.0.clone();

    #[cfg(target_arch = "wasm32")]
    {
        use firedrill_core::XrPlatform;
        use wasm_bindgen_futures::spawn_local;

        spawn_local(async move {
            let result = WebXrPlatform.request_session(&options).await;
            if let Ok(mut queue) = pending_clone.lock() {
                queue.push(result);
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::info!(mode = options.session_mode.as_str(), "WebXR not available in native mode");
        if let Ok(mut queue) = pending_clone.lock() {
            queue.push(Err(XrError::Unsupported));
        };
    }
}

fn complete_immersive_session(pending: Res<PendingXrResults>, mut drill: ResMut<DrillScene>) {
    let results = {
        if let Ok(mut queue) = pending.0.lock() {
            std::mem::take(&mut *queue)
        } else {
            Vec::new()
        }
    };

    let DrillScene { ctx, composer } = &mut *drill;
    for result in results {
        composer.complete_immersive_session(ctx, result);
    }
}

/// Raise scene notices as `window.alert`
fn show_alerts(mode: Res<NotificationMode>, mut drill: ResMut<DrillScene>) {
    if *mode != NotificationMode::Host || drill.ctx.pending_notifications().is_empty() {
        return;
    }
    for notice in drill.ctx.drain_notifications() {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.alert_with_message(&notice.message) {
                    tracing::error!("Failed to show alert: {:?}", e);
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::info!(message = %notice.message, "Notice");
        }
    }
}

/// `navigator.xr` through `js-sys`
#[cfg(target_arch = "wasm32")]
pub struct WebXrPlatform;

#[cfg(target_arch = "wasm32")]
impl firedrill_core::XrPlatform for WebXrPlatform {
    async fn request_session(&self, options: &XrSessionOptions) -> Result<XrSessionInfo, XrError> {
        use js_sys::{Array, Object, Reflect};
        use wasm_bindgen::JsValue;

        let window = web_sys::window().ok_or(XrError::Unsupported)?;
        let xr = Reflect::get(&window.navigator(), &JsValue::from_str("xr"))
            .map_err(|_| XrError::Unsupported)?;
        if xr.is_undefined() || xr.is_null() {
            return Err(XrError::Unsupported);
        }

        let mode = options.session_mode.as_str();
        let supported = call_promise(&xr, "isSessionSupported", &[JsValue::from_str(mode)])
            .await
            .map_err(|_| XrError::ModeNotSupported(mode))?;
        if !supported.as_bool().unwrap_or(false) {
            return Err(XrError::ModeNotSupported(mode));
        }

        let features: Array = options
            .optional_features
            .resolve()
            .iter()
            .map(|f| JsValue::from_str(f))
            .collect();
        let init = Object::new();
        Reflect::set(&init, &JsValue::from_str("optionalFeatures"), &features)
            .map_err(|e| XrError::Denied(js_message(&e)))?;

        let session = call_promise(&xr, "requestSession", &[JsValue::from_str(mode), init.into()])
            .await
            .map_err(|e| XrError::Denied(js_message(&e)))?;

        let space = options.reference_space_type.as_str();
        if call_promise(&session, "requestReferenceSpace", &[JsValue::from_str(space)])
            .await
            .is_err()
        {
            end_session(&session).await;
            return Err(XrError::ReferenceSpace(space));
        }

        let enabled_features: Vec<String> = Reflect::get(&session, &JsValue::from_str("enabledFeatures"))
            .ok()
            .filter(Array::is_array)
            .map(|v| Array::from(&v).iter().filter_map(|f| f.as_string()).collect())
            .unwrap_or_default();

        // No XRWebGLLayer: Bevy's renderer draws to the canvas only
        tracing::info!(mode, features = ?enabled_features, "Session granted, ending it");
        end_session(&session).await;
        Err(XrError::NotPresentable)
    }
}

#[cfg(target_arch = "wasm32")]
async fn end_session(session: &wasm_bindgen::JsValue) {
    if let Err(e) = call_promise(session, "end", &[]).await {
        tracing::warn!("Failed to end XR session: {}", js_message(&e));
    }
}

/// Call `target[method](...args)` and await the promise it returns
#[cfg(target_arch = "wasm32")]
async fn call_promise(
    target: &wasm_bindgen::JsValue,
    method: &str,
    args: &[wasm_bindgen::JsValue],
) -> Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue> {
    use js_sys::{Array, Function, Promise, Reflect};
    use wasm_bindgen::JsCast;

    let func: Function = Reflect::get(target, &wasm_bindgen::JsValue::from_str(method))?.dyn_into()?;
    let args: Array = args.iter().collect();
    let promise: Promise = func.apply(target, &args)?.dyn_into()?;
    wasm_bindgen_futures::JsFuture::from(promise).await
}

#[cfg(target_arch = "wasm32")]
fn js_message(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &wasm_bindgen::JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use firedrill_core::{ScenePreset, XrStatus};

    fn xr_app(preset: ScenePreset) -> App {
        let config = preset.config();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(DrillScene::compose(&config))
            .insert_resource(NotificationMode::Host)
            .add_plugins(WebXrPlugin {
                options: config.xr.clone(),
            });
        app
    }

    fn status(app: &App) -> XrStatus {
        app.world().resource::<DrillScene>().ctx.xr_status().clone()
    }

    #[test]
    fn test_nothing_is_sent_before_the_button() {
        let mut app = xr_app(ScenePreset::TrainingRoom);
        for _ in 0..3 {
            app.update();
        }
        assert!(status(&app).is_pending());
        assert!(app.world().resource::<XrEntry>().offer());
    }

    #[test]
    fn test_button_sends_exactly_one_request() {
        let mut app = xr_app(ScenePreset::TrainingRoom);
        app.update();

        app.world_mut().resource_mut::<XrEntry>().press();
        app.update();
        assert_eq!(status(&app), XrStatus::Fallback(XrError::Unsupported));
        assert!(!app.world().resource::<XrEntry>().offer());

        // A late press changes nothing
        app.world_mut().resource_mut::<XrEntry>().press();
        app.update();
        assert_eq!(status(&app), XrStatus::Fallback(XrError::Unsupported));
        let pending = app.world().resource::<PendingXrResults>().0.clone();
        assert!(pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_scene_without_xr_offers_nothing() {
        let mut app = xr_app(ScenePreset::Classroom);
        app.update();
        app.world_mut().resource_mut::<XrEntry>().press();
        app.update();
        assert_eq!(status(&app), XrStatus::NotRequested);
        assert!(!app.world().resource::<XrEntry>().offer());
    }

    #[test]
    fn test_entry_ignores_press_until_armed() {
        let mut entry = XrEntry::new(Some(XrSessionOptions::default()));
        entry.press();
        assert!(entry.take_request().is_none());

        entry.armed = true;
        entry.press();
        assert!(entry.take_request().is_some());
        assert!(entry.take_request().is_none());
    }

    #[test]
    fn test_button_labels() {
        assert_eq!(button_label(SessionMode::ImmersiveAr), "Enter AR");
        assert_eq!(button_label(SessionMode::ImmersiveVr), "Enter VR");
    }
}

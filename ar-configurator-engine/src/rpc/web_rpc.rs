use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::configurator::{AttachmentKind, ColorHex, ConfiguratorSession, SurfacePose};
use crate::engine::camera::viewer_camera::ViewerPose;
use crate::engine::core::app_state::RuntimeSet;
use crate::tools::commands::{CommandEvent, CommandSource, ConfiguratorCommand};
use crate::tools::surface_tracker::SurfaceTracker;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure. Notifications carry no `id`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the WebRPC communication layer.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(RuntimeSet::Input),
            )
            .add_systems(Update, send_outgoing_messages.in_set(RuntimeSet::Flush));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => error!("Window object not available"),
    }

    // Ownership moves to JS so the listener outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Engine state an RPC call may read or feed.
struct RpcContext<'a, 'w> {
    command_events: &'a mut EventWriter<'w, CommandEvent>,
    tracker: &'a mut SurfaceTracker,
    viewer_pose: &'a mut ViewerPose,
    session: &'a ConfiguratorSession,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut command_events: EventWriter<CommandEvent>,
    mut tracker: ResMut<SurfaceTracker>,
    mut viewer_pose: ResMut<ViewerPose>,
    session: Res<ConfiguratorSession>,
) {
    let mut context = RpcContext {
        command_events: &mut command_events,
        tracker: &mut tracker,
        viewer_pose: &mut viewer_pose,
        session: &session,
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Handle one RPC message. Only requests with an id get a response.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let params = &request.params;
    let result = match request.method.as_str() {
        "select_variant" => handle_select_variant(params, context.command_events),
        "pick_color" => handle_pick_color(params, context.command_events),
        "set_scale" => handle_set_scale(params, context.command_events),
        "set_rotation" => handle_set_rotation(params, context.command_events),
        "toggle_attachment" => handle_toggle_attachment(params, context.command_events),
        "place" => dispatch(context.command_events, ConfiguratorCommand::PlaceOrReposition),
        "reposition" => dispatch(context.command_events, ConfiguratorCommand::ArmReposition),
        "reset" => dispatch(context.command_events, ConfiguratorCommand::Reset),
        "export" => dispatch(context.command_events, ConfiguratorCommand::Export),
        "surface_hit" => handle_surface_hit(params, context.tracker),
        "viewer_pose" => handle_viewer_pose(params, context.viewer_pose),
        "get_catalog" => handle_get_catalog(context.session),
        "get_configuration" => handle_get_configuration(context.session),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let Some(id) = request.id.clone() else {
        if let Err(error) = &result {
            warn!("RPC notification '{}' rejected: {}", request.method, error.message);
        }
        return None;
    };

    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn dispatch(
    command_events: &mut EventWriter<CommandEvent>,
    command: ConfiguratorCommand,
) -> Result<serde_json::Value, RpcError> {
    info!("RPC command dispatched: {:?}", command);
    command_events.write(CommandEvent::new(command, CommandSource::Rpc));
    Ok(serde_json::json!({ "success": true }))
}

fn handle_select_variant(
    params: &serde_json::Value,
    command_events: &mut EventWriter<CommandEvent>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct VariantParams {
        variant: String,
    }

    let parsed = serde_json::from_value::<VariantParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'variant' parameter"))?;
    dispatch(command_events, ConfiguratorCommand::SelectVariant(parsed.variant))
}

fn handle_pick_color(
    params: &serde_json::Value,
    command_events: &mut EventWriter<CommandEvent>,
) -> Result<serde_json::Value, RpcError> {
    let color = parse_color(params)?;
    dispatch(command_events, ConfiguratorCommand::PickColor(color))
}

fn handle_set_scale(
    params: &serde_json::Value,
    command_events: &mut EventWriter<CommandEvent>,
) -> Result<serde_json::Value, RpcError> {
    let scale = parse_finite(params, "scale")?;
    dispatch(command_events, ConfiguratorCommand::SetScale(scale))
}

fn handle_set_rotation(
    params: &serde_json::Value,
    command_events: &mut EventWriter<CommandEvent>,
) -> Result<serde_json::Value, RpcError> {
    let yaw = parse_finite(params, "yaw")?;
    dispatch(command_events, ConfiguratorCommand::SetYaw(yaw))
}

fn handle_toggle_attachment(
    params: &serde_json::Value,
    command_events: &mut EventWriter<CommandEvent>,
) -> Result<serde_json::Value, RpcError> {
    let (kind, enabled) = parse_attachment_toggle(params)?;
    dispatch(
        command_events,
        ConfiguratorCommand::ToggleAttachment { kind, enabled },
    )
}

fn handle_surface_hit(
    params: &serde_json::Value,
    tracker: &mut SurfaceTracker,
) -> Result<serde_json::Value, RpcError> {
    let pose = parse_pose(params)?;
    let tracked = pose.is_some();
    tracker.update(pose);
    Ok(serde_json::json!({ "tracked": tracked }))
}

fn handle_viewer_pose(
    params: &serde_json::Value,
    viewer_pose: &mut ViewerPose,
) -> Result<serde_json::Value, RpcError> {
    let pose = parse_pose(params)?
        .ok_or_else(|| RpcError::invalid_params("Expected 'position' parameter"))?;
    viewer_pose.set(pose.position, pose.orientation);
    Ok(serde_json::json!({ "success": true }))
}

fn handle_get_catalog(session: &ConfiguratorSession) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(session.catalog())
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise catalog: {e}")))
}

fn handle_get_configuration(
    session: &ConfiguratorSession,
) -> Result<serde_json::Value, RpcError> {
    let config = serde_json::to_value(session.export())
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise configuration: {e}")))?;

    Ok(serde_json::json!({
        "placed": session.is_placed(),
        "reposition_armed": session.is_reposition_armed(),
        "status": session.status().as_str(),
        "config": config,
    }))
}

fn parse_color(params: &serde_json::Value) -> Result<ColorHex, RpcError> {
    #[derive(Deserialize)]
    struct ColorParams {
        color: String,
    }

    let parsed = serde_json::from_value::<ColorParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'color' parameter"))?;
    ColorHex::parse(&parsed.color).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

fn parse_finite(params: &serde_json::Value, field: &str) -> Result<f32, RpcError> {
    params
        .get(field)
        .and_then(|value| value.as_f64())
        .map(|value| value as f32)
        .filter(|value| value.is_finite())
        .ok_or_else(|| RpcError::invalid_params(&format!("Expected numeric '{field}' parameter")))
}

fn parse_attachment_toggle(
    params: &serde_json::Value,
) -> Result<(AttachmentKind, bool), RpcError> {
    #[derive(Deserialize)]
    struct ToggleParams {
        name: String,
        enabled: bool,
    }

    let parsed = serde_json::from_value::<ToggleParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' and 'enabled' parameters"))?;
    let kind = AttachmentKind::from_string(&parsed.name).ok_or_else(|| {
        RpcError::invalid_params(&format!("Unknown attachment: {}", parsed.name))
    })?;
    Ok((kind, parsed.enabled))
}

/// `{position, orientation}` to a pose; a missing or null position means no hit.
fn parse_pose(params: &serde_json::Value) -> Result<Option<SurfacePose>, RpcError> {
    #[derive(Deserialize)]
    struct PoseParams {
        #[serde(default)]
        position: Option<[f32; 3]>,
        #[serde(default)]
        orientation: Option<[f32; 4]>,
    }

    let parsed = serde_json::from_value::<PoseParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'position' as [x, y, z]"))?;

    let Some(position) = parsed.position.map(Vec3::from_array) else {
        return Ok(None);
    };
    if !position.is_finite() {
        return Err(RpcError::invalid_params("Position must be finite"));
    }

    let orientation = parsed
        .orientation
        .map(Quat::from_array)
        .filter(|q| q.is_finite() && q.length_squared() > f32::EPSILON)
        .map(Quat::normalize)
        .unwrap_or(Quat::IDENTITY);

    Ok(Some(SurfacePose {
        position,
        orientation,
    }))
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    if rpc_interface.outgoing_notifications.is_empty()
        && rpc_interface.outgoing_responses.is_empty()
    {
        return;
    }

    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

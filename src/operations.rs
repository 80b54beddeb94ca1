//! Editor operation catalogue.
//!
//! Each [`Tool`] is a thin adapter over [`BridgeClient::execute`]: it names
//! the plugin command, marshals its arguments into the parameter object and
//! renders the [`Reply`] as text for whoever invoked it.
//!
//! Tools are addressable by name with a JSON argument object:
//!
//! ```ignore
//! let text = run_tool(&mut client, "find_assets", json!({"asset_name": "Floor"})).await;
//! ```

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::ipc::BridgeClient;
use crate::reply::{value_to_text, BridgeError, Reply};

/// Name and one-line description of every tool.
pub const TOOLS: &[(&str, &str)] = &[
    ("get_actors", "List all actors in the current level"),
    ("get_actor_details", "Get details for a specific actor by name"),
    ("spawn_actor", "Spawn an actor in the current level"),
    ("modify_actor", "Modify a property of an existing actor"),
    ("get_selected_actors", "Get the currently selected actors in the editor"),
    ("set_material", "Apply a material to a static mesh actor"),
    ("delete_all_static_mesh_actors", "Delete all static mesh actors in the scene"),
    ("get_project_dir", "Get the top level project directory"),
    ("get_content_dir", "Get the content directory"),
    ("find_basic_shapes", "Search for basic shapes for building"),
    ("find_assets", "Search for specific assets by name, like Floor, Wall, Door"),
    ("get_asset", "Get the dimensions of an asset"),
    ("create_grid", "Create a grid evenly spaced with the provided asset"),
    ("create_town", "Create a town using supplied assets"),
    ("run_blueprint_function", "Execute a function in a Blueprint"),
    ("execute_python", "Execute arbitrary Python code in Unreal Engine"),
];

/// Arguments for [`Tool::SpawnActor`]; every transform component defaults to 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnActorArgs {
    pub asset_path: String,
    #[serde(default)]
    pub location_x: f64,
    #[serde(default)]
    pub location_y: f64,
    #[serde(default)]
    pub location_z: f64,
    #[serde(default)]
    pub rotation_x: f64,
    #[serde(default)]
    pub rotation_y: f64,
    #[serde(default)]
    pub rotation_z: f64,
    #[serde(default)]
    pub scale_x: f64,
    #[serde(default)]
    pub scale_y: f64,
    #[serde(default)]
    pub scale_z: f64,
}

/// One editor operation with its arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum Tool {
    GetActors {},
    GetActorDetails {
        actor_name: String,
    },
    SpawnActor(SpawnActorArgs),
    ModifyActor {
        actor_name: String,
        property_name: String,
        property_value: String,
    },
    GetSelectedActors {},
    SetMaterial {
        actor_name: String,
        material_path: String,
    },
    DeleteAllStaticMeshActors {},
    GetProjectDir {},
    GetContentDir {},
    FindBasicShapes {},
    FindAssets {
        asset_name: String,
    },
    GetAsset {
        asset_path: String,
    },
    CreateGrid {
        asset_path: String,
        grid_width: i64,
        grid_length: i64,
    },
    CreateTown {
        town_center_x: i64,
        town_center_y: i64,
        town_width: i64,
        town_height: i64,
    },
    RunBlueprintFunction {
        blueprint_name: String,
        function_name: String,
        #[serde(default)]
        arguments: String,
    },
    ExecutePython {
        code: String,
    },
}

/// How a successful result is turned into text.
enum SuccessFormat {
    /// Markdown actor list under a heading, with optional empty-list text.
    ActorList {
        heading: &'static str,
        when_empty: Option<&'static str>,
    },
    /// Markdown key/value list for one actor.
    ActorDetails(String),
    /// The result as text, or a fixed message if there is none.
    TextOr(&'static str),
    /// The result as text.
    Text,
    /// The result re-encoded as JSON.
    Json,
}

/// How an error reply is turned into text.
enum ErrorFormat {
    /// `Error: <message>`
    Message,
    /// `Error: <message>` followed by the remote traceback.
    MessageWithTraceback,
    /// The whole reply as JSON.
    ReplyJson,
    /// The whole reply as JSON behind a prefix.
    PrefixedReplyJson(&'static str),
}

impl Tool {
    /// Resolve a tool from its name and JSON arguments.
    pub fn from_call(name: &str, args: Value) -> Result<Self, serde_json::Error> {
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        serde_json::from_value(json!({ "tool": name, "args": args }))
    }

    /// Plugin command name.
    pub fn command(&self) -> &'static str {
        match self {
            Tool::GetActors {} => "get_actors",
            Tool::GetActorDetails { .. } => "get_actor_details",
            Tool::SpawnActor(_) => "spawn_actor",
            Tool::ModifyActor { .. } => "modify_actor",
            Tool::GetSelectedActors {} => "get_selected_actors",
            Tool::SetMaterial { .. } => "set_material",
            Tool::DeleteAllStaticMeshActors {} => "delete_all_static_mesh_actors",
            Tool::GetProjectDir {} => "get_project_dir",
            Tool::GetContentDir {} => "get_content_dir",
            Tool::FindBasicShapes {} => "find_basic_shapes",
            Tool::FindAssets { .. } => "find_assets",
            Tool::GetAsset { .. } => "get_asset",
            Tool::CreateGrid { .. } => "create_grid",
            Tool::CreateTown { .. } => "create_town",
            Tool::RunBlueprintFunction { .. } => "execute_blueprint_function",
            Tool::ExecutePython { .. } => "execute_python",
        }
    }

    /// Plugin parameter object.
    pub fn params(&self) -> Value {
        match self {
            Tool::GetActors {}
            | Tool::GetSelectedActors {}
            | Tool::DeleteAllStaticMeshActors {}
            | Tool::GetProjectDir {}
            | Tool::GetContentDir {}
            | Tool::FindBasicShapes {} => json!({}),
            Tool::GetActorDetails { actor_name } => json!({ "actor_name": actor_name }),
            Tool::SpawnActor(t) => json!({
                "asset_path": t.asset_path,
                "location_x": t.location_x,
                "location_y": t.location_y,
                "location_z": t.location_z,
                "rotation_x": t.rotation_x,
                "rotation_y": t.rotation_y,
                "rotation_z": t.rotation_z,
                "scale_x": t.scale_x,
                "scale_y": t.scale_y,
                "scale_z": t.scale_z,
            }),
            Tool::ModifyActor {
                actor_name,
                property_name,
                property_value,
            } => json!({
                "actor_name": actor_name,
                "property_name": property_name,
                "property_value": property_value,
            }),
            Tool::SetMaterial {
                actor_name,
                material_path,
            } => json!({
                "actor_name": actor_name,
                "material_path": material_path,
            }),
            Tool::FindAssets { asset_name } => json!({ "asset_name": asset_name }),
            Tool::GetAsset { asset_path } => json!({ "asset_path": asset_path }),
            Tool::CreateGrid {
                asset_path,
                grid_width,
                grid_length,
            } => json!({
                "asset_path": asset_path,
                "grid_width": grid_width,
                "grid_length": grid_length,
            }),
            Tool::CreateTown {
                town_center_x,
                town_center_y,
                town_width,
                town_height,
            } => json!({
                "town_center_x": town_center_x,
                "town_center_y": town_center_y,
                "town_width": town_width,
                "town_height": town_height,
            }),
            Tool::RunBlueprintFunction {
                blueprint_name,
                function_name,
                arguments,
            } => json!({
                "blueprint_name": blueprint_name,
                "function_name": function_name,
                "arguments": arguments,
            }),
            // The plugin exec()s the code inside a triple-quoted literal.
            Tool::ExecutePython { code } => json!({ "code": format!("\"\"{code}\"\"") }),
        }
    }

    fn success_format(&self) -> SuccessFormat {
        match self {
            Tool::GetActors {} => SuccessFormat::ActorList {
                heading: "# Actors in the current level",
                when_empty: None,
            },
            Tool::GetSelectedActors {} => SuccessFormat::ActorList {
                heading: "# Currently Selected Actors",
                when_empty: Some("No actors are currently selected."),
            },
            Tool::GetActorDetails { actor_name } => SuccessFormat::ActorDetails(actor_name.clone()),
            Tool::SpawnActor(_) => SuccessFormat::TextOr("Actor created successfully"),
            Tool::ModifyActor { .. } => SuccessFormat::TextOr("Actor modified successfully"),
            Tool::SetMaterial { .. } => SuccessFormat::TextOr("Material applied successfully"),
            Tool::RunBlueprintFunction { .. } => {
                SuccessFormat::TextOr("Blueprint function executed successfully")
            }
            Tool::ExecutePython { .. } => SuccessFormat::TextOr("Code executed successfully"),
            Tool::DeleteAllStaticMeshActors {}
            | Tool::GetProjectDir {}
            | Tool::GetContentDir {}
            | Tool::CreateTown { .. } => SuccessFormat::Text,
            Tool::FindBasicShapes {}
            | Tool::FindAssets { .. }
            | Tool::GetAsset { .. }
            | Tool::CreateGrid { .. } => SuccessFormat::Json,
        }
    }

    fn error_format(&self) -> ErrorFormat {
        match self {
            Tool::GetActors {} => ErrorFormat::PrefixedReplyJson("get_actors error: "),
            Tool::ExecutePython { .. } => ErrorFormat::MessageWithTraceback,
            Tool::GetActorDetails { .. }
            | Tool::SpawnActor(_)
            | Tool::ModifyActor { .. }
            | Tool::GetSelectedActors {}
            | Tool::SetMaterial { .. }
            | Tool::RunBlueprintFunction { .. } => ErrorFormat::Message,
            _ => ErrorFormat::ReplyJson,
        }
    }

    /// Render a reply for this tool.
    pub fn format(&self, reply: &Reply) -> String {
        match reply {
            Reply::Success(result) => format_success(&self.success_format(), result),
            Reply::Error(err) => match self.error_format() {
                ErrorFormat::Message => format!("Error: {}", err.message()),
                ErrorFormat::MessageWithTraceback => format_python_error(err),
                ErrorFormat::ReplyJson => reply.to_value().to_string(),
                ErrorFormat::PrefixedReplyJson(prefix) => {
                    format!("{prefix}{}", reply.to_value())
                }
            },
        }
    }

    /// Run the tool against the editor and render the reply.
    pub async fn run(&self, client: &mut BridgeClient) -> String {
        tracing::info!("{}", self.command());
        let reply = client.execute(self.command(), self.params()).await;
        self.format(&reply)
    }
}

/// Resolve and run a tool by name; unknown tools and bad arguments are
/// reported as text.
pub async fn run_tool(client: &mut BridgeClient, name: &str, args: Value) -> String {
    match Tool::from_call(name, args) {
        Ok(tool) => tool.run(client).await,
        Err(e) => format!("Error: invalid call to '{name}': {e}"),
    }
}

fn format_success(format: &SuccessFormat, result: &Value) -> String {
    match format {
        SuccessFormat::ActorList {
            heading,
            when_empty,
        } => {
            let actors = result.as_array().map(Vec::as_slice).unwrap_or_default();
            if let (true, Some(text)) = (actors.is_empty(), when_empty) {
                return text.to_string();
            }
            let mut response = format!("{heading}\n\n");
            for actor in actors {
                response.push_str(&format!(
                    "- {} ({})\n",
                    field_text(actor, "name"),
                    field_text(actor, "class")
                ));
                response.push_str(&format!("  Location: {}\n", field_text(actor, "location")));
            }
            response
        }
        SuccessFormat::ActorDetails(actor_name) => {
            let mut response = format!("# Actor: {actor_name}\n\n");
            if let Some(fields) = result.as_object() {
                for (key, value) in fields {
                    response.push_str(&format!("- {}: {}\n", key, value_to_text(value)));
                }
            }
            response
        }
        // An explicit `"result": null` also gets the default text; the
        // editor never sends one on purpose.
        SuccessFormat::TextOr(default) => match result {
            Value::Null => default.to_string(),
            other => value_to_text(other),
        },
        SuccessFormat::Text => value_to_text(result),
        SuccessFormat::Json => result.to_string(),
    }
}

/// `execute_python` replies are not always objects: a bare `null` means the
/// code ran with nothing to report, and a bare value is the error itself.
fn format_python_error(err: &BridgeError) -> String {
    match err {
        BridgeError::Remote {
            payload: Value::Null,
            ..
        } => "Code executed successfully".to_string(),
        BridgeError::Remote { payload, message, .. } if !payload.is_object() => {
            format!("Error: {message}")
        }
        _ => format!(
            "Error: {}\n\n{}",
            err.message(),
            err.traceback().unwrap_or_default()
        ),
    }
}

fn field_text(value: &Value, key: &str) -> String {
    value.get(key).map(value_to_text).unwrap_or_else(|| "None".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remote_error(message: &str) -> Reply {
        Reply::from_value(json!({"status": "error", "message": message}))
    }

    #[test]
    fn test_tool_catalogue_resolves_every_name() {
        let args = json!({
            "actor_name": "Cube",
            "property_name": "Mobility",
            "property_value": "Movable",
            "material_path": "/Game/Materials/M_Basic",
            "asset_name": "Floor",
            "asset_path": "/Game/Shapes/Cube",
            "grid_width": 3,
            "grid_length": 4,
            "town_center_x": 0,
            "town_center_y": 0,
            "town_width": 7500,
            "town_height": 7500,
            "blueprint_name": "BP_Door",
            "function_name": "Open",
            "code": "print(1)"
        });
        for (name, _) in TOOLS {
            let tool = Tool::from_call(name, args.clone())
                .unwrap_or_else(|e| panic!("{name} failed to resolve: {e}"));
            assert!(!tool.command().is_empty());
        }
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        assert!(Tool::from_call("delete_everything", json!({})).is_err());
    }

    #[test]
    fn test_missing_required_argument_is_rejected() {
        assert!(Tool::from_call("get_actor_details", json!({})).is_err());
    }

    #[test]
    fn test_no_argument_tools_accept_null_args() {
        let tool = Tool::from_call("get_actors", Value::Null).unwrap();
        assert_eq!(tool, Tool::GetActors {});
        assert_eq!(tool.params(), json!({}));
    }

    #[test]
    fn test_spawn_actor_defaults_transform() {
        let tool = Tool::from_call(
            "spawn_actor",
            json!({"asset_path": "/Game/Shapes/Cube", "location_z": 120.5}),
        )
        .unwrap();
        let params = tool.params();
        assert_eq!(params["asset_path"], "/Game/Shapes/Cube");
        assert_eq!(params["location_z"], 120.5);
        assert_eq!(params["scale_x"], 0.0);
    }

    #[test]
    fn test_blueprint_command_name_and_default_arguments() {
        let tool = Tool::from_call(
            "run_blueprint_function",
            json!({"blueprint_name": "BP_Door", "function_name": "Open"}),
        )
        .unwrap();
        assert_eq!(tool.command(), "execute_blueprint_function");
        assert_eq!(tool.params()["arguments"], "");
    }

    #[test]
    fn test_execute_python_wraps_code() {
        let tool = Tool::ExecutePython {
            code: "print('hi')".into(),
        };
        assert_eq!(tool.params(), json!({"code": "\"\"print('hi')\"\""}));
    }

    #[test]
    fn test_actor_list_format() {
        let reply = Reply::Success(json!([
            {"name": "Floor", "class": "StaticMeshActor", "location": [0, 0, 0]},
        ]));
        assert_eq!(
            Tool::GetActors {}.format(&reply),
            "# Actors in the current level\n\n- Floor (StaticMeshActor)\n  Location: [0,0,0]\n"
        );
    }

    #[test]
    fn test_empty_selection() {
        let reply = Reply::Success(json!([]));
        assert_eq!(
            Tool::GetSelectedActors {}.format(&reply),
            "No actors are currently selected."
        );
        assert_eq!(
            Tool::GetActors {}.format(&reply),
            "# Actors in the current level\n\n"
        );
    }

    #[test]
    fn test_actor_details_format() {
        let tool = Tool::GetActorDetails {
            actor_name: "Cube".into(),
        };
        let reply = Reply::Success(json!({"class": "StaticMeshActor", "hidden": false}));
        assert_eq!(
            tool.format(&reply),
            "# Actor: Cube\n\n- class: StaticMeshActor\n- hidden: false\n"
        );
    }

    #[test]
    fn test_text_or_default() {
        let tool = Tool::SetMaterial {
            actor_name: "Cube".into(),
            material_path: "/Game/M".into(),
        };
        assert_eq!(
            tool.format(&Reply::Success(Value::Null)),
            "Material applied successfully"
        );
        assert_eq!(tool.format(&Reply::Success(json!("applied"))), "applied");
        assert_eq!(
            tool.format(&remote_error("No such material")),
            "Error: No such material"
        );
    }

    #[test]
    fn test_json_result_and_reply_json_error() {
        let tool = Tool::FindAssets {
            asset_name: "Floor".into(),
        };
        assert_eq!(
            tool.format(&Reply::Success(json!(["/Game/Floor_400x400"]))),
            r#"["/Game/Floor_400x400"]"#
        );
        assert_eq!(
            tool.format(&remote_error("nothing")),
            r#"{"message":"nothing","status":"error"}"#
        );
    }

    #[test]
    fn test_get_actors_error_prefix() {
        let reply = Reply::Error(BridgeError::Communication("reset".into()));
        assert_eq!(
            Tool::GetActors {}.format(&reply),
            r#"get_actors error: {"message":"Communication error: reset","status":"error"}"#
        );
    }

    #[test]
    fn test_execute_python_bare_payloads() {
        let tool = Tool::ExecutePython { code: "x = 1".into() };
        assert_eq!(
            tool.format(&Reply::from_value(Value::Null)),
            "Code executed successfully"
        );
        assert_eq!(tool.format(&Reply::from_value(json!("boom"))), "Error: boom");
        assert_eq!(tool.format(&Reply::from_value(json!(42))), "Error: 42");
    }

    #[test]
    fn test_execute_python_local_error_has_blank_traceback() {
        let tool = Tool::ExecutePython { code: "x = 1".into() };
        let reply = Reply::Error(BridgeError::Communication("reset".into()));
        assert_eq!(tool.format(&reply), "Error: Communication error: reset\n\n");
    }

    #[test]
    fn test_text_or_default_for_explicit_null_result() {
        let tool = Tool::ModifyActor {
            actor_name: "Cube".into(),
            property_name: "Mobility".into(),
            property_value: "Movable".into(),
        };
        let reply = Reply::from_value(json!({"status": "success", "result": null}));
        assert_eq!(tool.format(&reply), "Actor modified successfully");
    }

    #[test]
    fn test_execute_python_error_includes_traceback() {
        let tool = Tool::ExecutePython { code: "1/0".into() };
        let reply = Reply::from_value(json!({
            "status": "error",
            "message": "ZeroDivisionError",
            "traceback": "File \"<string>\", line 1"
        }));
        assert_eq!(
            tool.format(&reply),
            "Error: ZeroDivisionError\n\nFile \"<string>\", line 1"
        );
    }
}

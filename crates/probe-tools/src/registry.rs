//! Tools by name, for callers that speak JSON.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use tracing::error;

use crate::{BridgeTools, ToolError};

/// Type-erased tool entry point: JSON arguments in, JSON reply out.
type Handler = Box<dyn Fn(&BridgeTools, Json) -> Result<Json, ToolError> + Send + Sync>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParameterDescriptor],
}

const fn param(name: &'static str, description: &'static str) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        description,
        required: false,
    }
}

const fn required(name: &'static str, description: &'static str) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        description,
        required: true,
    }
}

const MAX_RESULTS: ParameterDescriptor = param("maxResults", "Maximum number of results to return");
const INCLUDE_MEMBERS: ParameterDescriptor =
    param("includeMembers", "Include member values (fields/properties)");

const SEARCH_OBJECTS: ToolDescriptor = ToolDescriptor {
    name: "unity_search_objects",
    description: "Search for objects (GameObjects, Components) by name and optional type filter",
    parameters: &[
        param("nameFilter", "Name filter (partial match, case-insensitive)"),
        param("typeFilter", "Type filter (e.g. 'GameObject', 'Light', 'Player')"),
        param("sceneFilter", "Scene filter: Any, ActivelyLoaded, DontDestroyOnLoad, HideAndDontSave"),
        param("childFilter", "Child filter: Any, RootObject, HasParent"),
        MAX_RESULTS,
    ],
};

const SEARCH_SINGLETONS: ToolDescriptor = ToolDescriptor {
    name: "unity_search_singletons",
    description: "Search for singleton instances by type name",
    parameters: &[param("typeFilter", "Type name filter (partial match)"), MAX_RESULTS],
};

const GET_LOADED_SCENES: ToolDescriptor = ToolDescriptor {
    name: "unity_get_loaded_scenes",
    description: "Get a list of all currently loaded scenes",
    parameters: &[],
};

const GET_SCENE_ROOTS: ToolDescriptor = ToolDescriptor {
    name: "unity_get_scene_roots",
    description: "Get root GameObjects in a scene",
    parameters: &[
        param("sceneHandle", "Scene handle from unity_get_loaded_scenes; defaults to the active scene"),
        MAX_RESULTS,
    ],
};

const INSPECT_OBJECT: ToolDescriptor = ToolDescriptor {
    name: "unity_inspect_object",
    description: "Get detailed information about an object by its instance id",
    parameters: &[
        required("instanceId", "Instance id from a previous search or scene listing"),
        INCLUDE_MEMBERS,
    ],
};

const READ_COMPONENT: ToolDescriptor = ToolDescriptor {
    name: "unity_read_component",
    description: "Read component data from a GameObject",
    parameters: &[
        required("gameObjectInstanceId", "Instance id of the GameObject"),
        required("componentType", "Component type name (e.g. 'Rigidbody', 'Player', 'Character')"),
        INCLUDE_MEMBERS,
    ],
};

const GET_CHILDREN: ToolDescriptor = ToolDescriptor {
    name: "unity_get_children",
    description: "Get child GameObjects of a parent",
    parameters: &[
        required("parentInstanceId", "Instance id of the parent GameObject"),
        param("includeComponents", "Include components in child data"),
        MAX_RESULTS,
    ],
};

const SEARCH_PREFABS: ToolDescriptor = ToolDescriptor {
    name: "znetscene_search_prefabs",
    description: "Search for prefabs by name in ZNetScene",
    parameters: &[
        param("nameFilter", "Name filter (partial match, case-insensitive)"),
        MAX_RESULTS,
    ],
};

const GET_PREFAB: ToolDescriptor = ToolDescriptor {
    name: "znetscene_get_prefab",
    description: "Get a prefab by exact name from ZNetScene",
    parameters: &[required("prefabName", "Exact prefab name")],
};

const LIST_PREFAB_NAMES: ToolDescriptor = ToolDescriptor {
    name: "znetscene_list_prefab_names",
    description: "List all prefab names in ZNetScene",
    parameters: &[param("prefix", "Optional prefix filter"), MAX_RESULTS],
};

const PLAYER_GET_HEALTH: ToolDescriptor = ToolDescriptor {
    name: "player_get_health",
    description: "Get the local player's current health statistics",
    parameters: &[],
};

const PLAYER_GET_POSITION: ToolDescriptor = ToolDescriptor {
    name: "player_get_position",
    description: "Get the local player's world position",
    parameters: &[],
};

const RUN_COMMAND: ToolDescriptor = ToolDescriptor {
    name: "run_command",
    description: "Execute a console command (e.g. 'spawn Boar 1 1', 'god', 'heal')",
    parameters: &[required("command", "The console command to execute")],
};

/// Every tool the bridge exposes, in listing order.
pub struct ToolRegistry {
    tools: BridgeTools,
    descriptors: Vec<ToolDescriptor>,
    handlers: Vec<Handler>,
    by_name: FxHashMap<&'static str, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.descriptors.len())
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new(tools: BridgeTools) -> Self {
        let mut registry = Self {
            tools,
            descriptors: Vec::new(),
            handlers: Vec::new(),
            by_name: FxHashMap::default(),
        };

        registry.register(SEARCH_OBJECTS, BridgeTools::search_objects);
        registry.register(SEARCH_SINGLETONS, BridgeTools::search_singletons);
        registry.register(GET_LOADED_SCENES, BridgeTools::get_loaded_scenes);
        registry.register(GET_SCENE_ROOTS, BridgeTools::get_scene_roots);
        registry.register(INSPECT_OBJECT, BridgeTools::inspect_object);
        registry.register(READ_COMPONENT, BridgeTools::read_component);
        registry.register(GET_CHILDREN, BridgeTools::get_children);
        registry.register(SEARCH_PREFABS, BridgeTools::search_prefabs);
        registry.register(GET_PREFAB, BridgeTools::get_prefab);
        registry.register(LIST_PREFAB_NAMES, BridgeTools::list_prefab_names);
        registry.register(PLAYER_GET_HEALTH, BridgeTools::player_get_health);
        registry.register(PLAYER_GET_POSITION, BridgeTools::player_get_position);
        registry.register(RUN_COMMAND, BridgeTools::run_command);

        registry
    }

    fn register<A, F>(&mut self, descriptor: ToolDescriptor, run: F)
    where
        A: DeserializeOwned + 'static,
        F: Fn(&BridgeTools, A) -> Json + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |tools, args| {
            let args = serde_json::from_value(args).map_err(ToolError::Arguments)?;
            Ok(run(tools, args))
        });
        self.by_name.insert(descriptor.name, self.descriptors.len());
        self.descriptors.push(descriptor);
        self.handlers.push(handler);
    }

    /// Descriptors of every registered tool.
    #[must_use]
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn tools(&self) -> &BridgeTools {
        &self.tools
    }

    /// Run a tool by name. `null` arguments count as `{}`.
    ///
    /// Never fails: unknown tools and malformed arguments become
    /// `{"success": false, "error": ...}` replies.
    pub fn call(&self, name: &str, args: Json) -> Json {
        let args = if args.is_null() {
            Json::Object(Map::new())
        } else {
            args
        };

        let outcome = match self.by_name.get(name) {
            Some(&index) => (self.handlers[index])(&self.tools, args),
            None => Err(ToolError::UnknownTool(name.to_owned())),
        };
        outcome.unwrap_or_else(|err| {
            error!(tool = name, %err, "tool call rejected");
            err.to_reply()
        })
    }
}

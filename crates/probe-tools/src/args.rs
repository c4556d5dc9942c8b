//! Tool arguments as they arrive on the wire (camelCase JSON).

use probe_core::InstanceId;
use probe_scene::SceneHandle;
use serde::Deserialize;

const fn default_max_results() -> usize {
    50
}

const fn default_list_limit() -> usize {
    100
}

const fn yes() -> bool {
    true
}

fn any_filter() -> String {
    "Any".to_owned()
}

/// Arguments of a tool that takes none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoArgs {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchObjectsArgs {
    /// Case-insensitive substring of the object name.
    #[serde(default)]
    pub name_filter: Option<String>,
    /// Short or full type name, e.g. `GameObject` or `UnityEngine.Light`.
    #[serde(default)]
    pub type_filter: Option<String>,
    #[serde(default = "any_filter")]
    pub scene_filter: String,
    #[serde(default = "any_filter")]
    pub child_filter: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchObjectsArgs {
    fn default() -> Self {
        Self {
            name_filter: None,
            type_filter: None,
            scene_filter: any_filter(),
            child_filter: any_filter(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSingletonsArgs {
    #[serde(default)]
    pub type_filter: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRootsArgs {
    /// Defaults to the active scene.
    #[serde(default)]
    pub scene_handle: Option<SceneHandle>,
    #[serde(default = "default_list_limit")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectObjectArgs {
    pub instance_id: InstanceId,
    #[serde(default = "yes")]
    pub include_members: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadComponentArgs {
    pub game_object_instance_id: InstanceId,
    pub component_type: String,
    #[serde(default = "yes")]
    pub include_members: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetChildrenArgs {
    pub parent_instance_id: InstanceId,
    #[serde(default)]
    pub include_components: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPrefabsArgs {
    #[serde(default)]
    pub name_filter: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPrefabArgs {
    pub prefab_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPrefabNamesArgs {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_list_limit")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunCommandArgs {
    pub command: String,
}

//! Prefab registry tools.

use std::sync::Arc;

use probe_core::HostObject;
use probe_scene::{ComponentCell, GameObject, SceneError, World, ZNetScene, layer_name};
use serde_json::{Map, Value as Json, json};

use crate::tools::success;
use crate::view::component_list;
use crate::{
    BridgeTools, GetPrefabArgs, HostView, ListPrefabNamesArgs, SearchPrefabsArgs, ToolError,
};

fn registry(world: &World) -> Result<Arc<ComponentCell<ZNetScene>>, ToolError> {
    Ok(world
        .znet_scene()
        .ok_or(SceneError::NotAvailable("ZNetScene"))?)
}

/// Prefab header; the transform is implied so no path or activity is given.
fn prefab(view: &HostView, prefab: &Arc<GameObject>, include_components: bool) -> Json {
    let state = prefab.state().clone();
    let mut out = Map::new();
    out.insert("instanceId".to_owned(), json!(view.cache().register_typed(prefab)));
    out.insert("name".to_owned(), json!(prefab.name()));
    out.insert("layer".to_owned(), json!(layer_name(state.layer)));
    out.insert("tag".to_owned(), json!(state.tag));
    out.insert("isStatic".to_owned(), json!(state.is_static));
    out.insert("childCount".to_owned(), json!(prefab.child_count()));
    if include_components {
        out.insert("components".to_owned(), component_list(prefab));
    }
    Json::Object(out)
}

impl BridgeTools {
    /// Prefabs whose name contains the filter, ignoring case.
    pub fn search_prefabs(&self, args: SearchPrefabsArgs) -> Json {
        self.on_host("znetscene_search_prefabs", move |world, view| {
            let prefabs = registry(world)?.read().prefabs.clone();
            if prefabs.is_empty() {
                return Err(ToolError::NoPrefabs);
            }

            let filter = args.name_filter.unwrap_or_default().to_lowercase();
            let matches: Vec<Json> = prefabs
                .iter()
                .filter(|p| p.is_alive() && p.name().to_lowercase().contains(&filter))
                .take(args.max_results)
                .map(|p| prefab(view, p, false))
                .collect();
            success(json!({
                "totalPrefabs": prefabs.len(),
                "matchCount": matches.len(),
                "prefabs": matches,
            }))
        })
    }

    /// One prefab by exact name, with its components.
    pub fn get_prefab(&self, args: GetPrefabArgs) -> Json {
        self.on_host("znetscene_get_prefab", move |world, view| {
            let found = registry(world)?
                .read()
                .get_prefab(&args.prefab_name)
                .ok_or(SceneError::PrefabNotFound(args.prefab_name))?;
            success(json!({ "prefab": prefab(view, &found, true) }))
        })
    }

    /// Prefab names, optionally only those starting with a prefix.
    pub fn list_prefab_names(&self, args: ListPrefabNamesArgs) -> Json {
        self.on_host("znetscene_list_prefab_names", move |world, _| {
            let names = registry(world)?.read().prefab_names();
            let prefix = args.prefix.unwrap_or_default().to_lowercase();
            let listed: Vec<&String> = names
                .iter()
                .filter(|name| name.to_lowercase().starts_with(&prefix))
                .take(args.max_results)
                .collect();
            success(json!({
                "totalPrefabs": names.len(),
                "returnedCount": listed.len(),
                "names": listed,
            }))
        })
    }
}

/// Shader cache - one module per distinct (name, stage) pair

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::drawable::ShaderSource;
use crate::engine_debug;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, Shader, ShaderDesc, ShaderStage};

const LOG_SOURCE: &str = "prism::ShaderCache";

/// Caches compiled shader modules by name and stage
///
/// Drawables naming the same shader share one module; the module is
/// destroyed when the cache entry and all drawables using it are gone.
pub struct ShaderCache {
    device: Arc<dyn GraphicsDevice>,
    modules: FxHashMap<(String, ShaderStage), Arc<dyn Shader>>,
}

impl ShaderCache {
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            modules: FxHashMap::default(),
        }
    }

    /// Look up the module for `source`, creating it on first use
    ///
    /// The bytecode of a later request under an already-cached name is
    /// ignored; the (name, stage) pair is the identity.
    pub fn get_or_create(&mut self, source: &ShaderSource) -> Result<Arc<dyn Shader>> {
        let key = (source.name.clone(), source.stage);
        if let Some(module) = self.modules.get(&key) {
            return Ok(Arc::clone(module));
        }
        engine_debug!(LOG_SOURCE, "Compiling shader '{}'", source.name);
        let module = self.device.create_shader(&ShaderDesc {
            name: source.name.clone(),
            stage: source.stage,
            code: source.code.clone(),
        })?;
        self.modules.insert(key, Arc::clone(&module));
        Ok(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Drop all cached handles; live drawables keep theirs
    pub fn clear(&mut self) {
        self.modules.clear();
    }
}

#[cfg(test)]
#[path = "shader_cache_tests.rs"]
mod tests;

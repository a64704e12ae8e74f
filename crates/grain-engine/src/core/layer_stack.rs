use slotmap::SlotMap;

use super::ctx::EngineCtx;
use super::layer::Layer;

slotmap::new_key_type! {
    /// Stable reference to a layer owned by a [`LayerStack`].
    ///
    /// Generation-checked: once the layer is popped the handle stays invalid,
    /// even if its slot is reused.
    pub struct LayerHandle;
}

struct Entry {
    handle: LayerHandle,
    layer: Box<dyn Layer>,
}

/// Ordered owner of layers: regular layers first, overlays after.
///
/// ```text
///  entries:  [ L0  L1  L2 | O0  O1 ]
///                         ^ insert_index
/// ```
///
/// Forward iteration is update/render order; reverse iteration is event order
/// (last overlay first).
#[derive(Default)]
pub struct LayerStack {
    entries: Vec<Entry>,
    insert_index: usize,
    index: SlotMap<LayerHandle, usize>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the end of the regular region and attaches the layer.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>, ctx: &mut EngineCtx) -> LayerHandle {
        let at = self.insert_index;
        let handle = self.insert(at, layer);
        self.insert_index += 1;
        self.attach(at, ctx);
        handle
    }

    /// Inserts at the end of the stack and attaches the layer.
    pub fn push_overlay(&mut self, layer: Box<dyn Layer>, ctx: &mut EngineCtx) -> LayerHandle {
        let at = self.entries.len();
        let handle = self.insert(at, layer);
        self.attach(at, ctx);
        handle
    }

    /// Detaches and drops a regular layer.
    ///
    /// Returns `false` (and changes nothing) if `handle` is stale or refers to
    /// an overlay.
    pub fn pop_layer(&mut self, handle: LayerHandle) -> bool {
        match self.index.get(handle) {
            Some(&at) if at < self.insert_index => {
                self.remove(at);
                self.insert_index -= 1;
                true
            }
            _ => false,
        }
    }

    /// Detaches and drops an overlay. Regular layers are never matched.
    pub fn pop_overlay(&mut self, handle: LayerHandle) -> bool {
        match self.index.get(handle) {
            Some(&at) if at >= self.insert_index => {
                self.remove(at);
                true
            }
            _ => false,
        }
    }

    pub fn is_valid(&self, handle: LayerHandle) -> bool {
        self.index.contains_key(handle)
    }

    pub fn get(&self, handle: LayerHandle) -> Option<&(dyn Layer + 'static)> {
        let at = *self.index.get(handle)?;
        Some(self.entries[at].layer.as_ref())
    }

    pub fn get_mut(&mut self, handle: LayerHandle) -> Option<&mut (dyn Layer + 'static)> {
        let at = *self.index.get(handle)?;
        Some(self.entries[at].layer.as_mut())
    }

    /// Regular layers in push order, then overlays in push order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(dyn Layer + 'static)> {
        self.entries.iter().map(|e| e.layer.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut (dyn Layer + 'static)> {
        self.entries.iter_mut().map(|e| e.layer.as_mut())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.insert_index
    }

    pub fn overlay_count(&self) -> usize {
        self.entries.len() - self.insert_index
    }

    /// Detaches every layer in stack order, then drops them all.
    ///
    /// Every handle issued so far becomes invalid.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        log::info!("clearing layer stack ({count} layers)");
        for entry in &mut self.entries {
            log::debug!("detaching layer '{}'", entry.layer.name());
            entry.layer.on_detach();
        }
        self.entries.clear();
        self.index.clear();
        self.insert_index = 0;
        log::info!("layer stack cleared ({count} layers detached)");
    }

    fn insert(&mut self, at: usize, layer: Box<dyn Layer>) -> LayerHandle {
        let handle = self.index.insert(at);
        self.entries.insert(at, Entry { handle, layer });
        self.reindex(at);
        handle
    }

    fn attach(&mut self, at: usize, ctx: &mut EngineCtx) {
        let layer = &mut self.entries[at].layer;
        log::debug!("attaching layer '{}'", layer.name());
        layer.on_attach(ctx);
    }

    fn remove(&mut self, at: usize) {
        let mut entry = self.entries.remove(at);
        log::debug!("detaching layer '{}'", entry.layer.name());
        entry.layer.on_detach();
        self.index.remove(entry.handle);
        self.reindex(at);
    }

    fn reindex(&mut self, from: usize) {
        for (at, entry) in self.entries.iter().enumerate().skip(from) {
            self.index[entry.handle] = at;
        }
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            self.clear();
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor component: wires host props to the compiler, the engine and the
//! runtime services, and collects what must be reported back.

use crate::props::{EditorOutput, EditorProps, EditorStatus};
use egui::Vec2;
use flowfunc_graph::{
    apply_statuses, Compiler, ConfigError, ElementId, EngineConfig, GraphEngine, MountKey,
    NodeSurface, Registry, Selection, SelectionOutput, SelectionTracker, StatusReport, Transform,
    ViewportController,
};
use std::sync::Arc;

/// A mounted editor
pub struct Editor<E: GraphEngine, S: NodeSurface> {
    compiler: Compiler,
    props: EditorProps,
    registry: Arc<Registry>,
    viewport: ViewportController,
    viewport_size: Vec2,
    tracker: SelectionTracker,
    engine: E,
    surface: S,
    outputs: Vec<EditorOutput>,
}

impl<E: GraphEngine, S: NodeSurface> Editor<E, S> {
    /// Compile the schema, mount the engine and bind click handlers
    pub fn new(
        compiler: Compiler,
        props: EditorProps,
        mut surface: S,
        viewport_size: Vec2,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(compiler.compile(&props.config, props.type_safety)?);
        let viewport = ViewportController::new(props.initial_scale);
        let engine = E::mount(engine_config(&registry, &props, &viewport));
        SelectionTracker::bind(&mut surface);

        let mut editor = Self {
            compiler,
            props,
            registry,
            viewport,
            viewport_size,
            tracker: SelectionTracker::new(),
            engine,
            surface,
            outputs: Vec::new(),
        };
        editor.adopt_default_nodes();
        editor.apply_statuses();
        tracing::info!(
            "Editor mounted: {} node types, {} nodes",
            editor.registry.node_type_count(),
            editor.engine.nodes().len()
        );
        Ok(editor)
    }

    /// Current props
    pub fn props(&self) -> &EditorProps {
        &self.props
    }

    /// Registry the engine was mounted with
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The engine instance
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine instance, for driving edits
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The rendered element tree
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The rendered element tree, for syncing rendered nodes
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        self.tracker.selection()
    }

    /// Last applied viewport transform
    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    /// Key of the current engine mount
    pub fn mount_key(&self) -> MountKey {
        self.engine.mount_key()
    }

    /// Outputs produced since the last call
    pub fn drain_outputs(&mut self) -> Vec<EditorOutput> {
        std::mem::take(&mut self.outputs)
    }

    /// Take new props from the host.
    ///
    /// Recompiles when the schema or the type safety flag changed, remounts
    /// when the host pushed nodes or changed engine options, fits on a rising
    /// `fit_to_view`, and reapplies statuses. On a compile error nothing
    /// changes.
    pub fn update(&mut self, props: EditorProps) -> Result<(), ConfigError> {
        let recompile =
            props.config != self.props.config || props.type_safety != self.props.type_safety;
        if recompile {
            self.registry = Arc::new(self.compiler.compile(&props.config, props.type_safety)?);
            self.viewport.remount();
        }

        let previous = std::mem::replace(&mut self.props, props);
        if self.props.is_server_update() {
            tracing::debug!("Host pushed {} nodes", self.props.nodes.len());
            self.viewport.remount();
        }
        if self.props.disable_zoom != previous.disable_zoom
            || self.props.disable_pan != previous.disable_pan
            || self.props.space_to_pan != previous.space_to_pan
        {
            self.viewport.remount();
        }
        if self.engine.mount_key() != self.viewport.mount_key() {
            self.remount();
        }
        if self.props.fit_to_view && !previous.fit_to_view {
            self.fit_to_view();
        }
        self.apply_statuses();
        Ok(())
    }

    /// Fit every node into the viewport
    pub fn fit_to_view(&mut self) -> Option<Transform> {
        let nodes = self.engine.nodes();
        let transform = self.viewport.fit(
            nodes.values(),
            self.viewport_size,
            Some(&mut self.engine as &mut dyn GraphEngine),
        )?;
        self.remount();
        Some(transform)
    }

    /// The viewport was resized; refit to the new size
    pub fn resize(&mut self, viewport_size: Vec2) -> Option<Transform> {
        self.viewport_size = viewport_size;
        self.fit_to_view()
    }

    /// Handle a click on a rendered element
    pub fn click(&mut self, target: ElementId, modifier: bool) {
        let nodes = self.engine.nodes();
        let outputs = self.tracker.click(
            &mut self.surface,
            nodes.keys().map(String::as_str),
            target,
            modifier,
        );
        self.emit_selection(outputs);
    }

    /// Handle a double click on a rendered element
    pub fn double_click(&mut self, target: ElementId) {
        let outputs = self.tracker.double_click(&mut self.surface, target);
        self.emit_selection(outputs);
    }

    /// The engine changed the graph; report its nodes and comments
    pub fn graph_changed(&mut self) {
        let nodes = self.engine.nodes();
        self.props.nodes.clone_from(&nodes);
        self.props.editor_status = Some(EditorStatus::Client);
        self.outputs.push(EditorOutput::Graph {
            editor_status: EditorStatus::Client,
            nodes,
            comments: self.engine.comments(),
        });
    }

    /// Flip the zoom toggle
    pub fn toggle_zoom(&mut self) {
        self.props.disable_zoom = !self.props.disable_zoom;
        self.outputs.push(EditorOutput::Zoom {
            disable_zoom: self.props.disable_zoom,
        });
        self.viewport.remount();
        self.remount();
    }

    /// Flip the pan toggle
    pub fn toggle_pan(&mut self) {
        self.props.disable_pan = !self.props.disable_pan;
        self.outputs.push(EditorOutput::Pan {
            disable_pan: self.props.disable_pan,
        });
        self.viewport.remount();
        self.remount();
    }

    fn emit_selection(&mut self, outputs: Vec<SelectionOutput>) {
        self.outputs
            .extend(outputs.into_iter().map(|output| match output {
                SelectionOutput::Selected(selected_nodes) => {
                    EditorOutput::Selection { selected_nodes }
                }
                SelectionOutput::DoubleClicked(double_clicked_node) => {
                    EditorOutput::DoubleClick {
                        double_clicked_node,
                    }
                }
            }));
    }

    fn remount(&mut self) {
        self.engine = E::mount(engine_config(&self.registry, &self.props, &self.viewport));
        self.engine.set_transform(self.viewport.transform());
        self.adopt_default_nodes();
    }

    /// Report nodes the engine created from `default_nodes` so later mounts
    /// reuse them instead of creating fresh ones
    fn adopt_default_nodes(&mut self) {
        if self.props.nodes.is_empty() && !self.engine.nodes().is_empty() {
            tracing::debug!("Adopting default nodes created by the engine");
            self.graph_changed();
        }
    }

    fn apply_statuses(&mut self) -> StatusReport {
        apply_statuses(&mut self.surface, self.props.nodes_status.as_ref())
    }
}

fn engine_config(
    registry: &Arc<Registry>,
    props: &EditorProps,
    viewport: &ViewportController,
) -> EngineConfig {
    EngineConfig {
        registry: Arc::clone(registry),
        nodes: props.nodes.clone(),
        default_nodes: props.default_nodes.clone(),
        context: props.context.clone(),
        initial_scale: viewport.initial_scale(),
        disable_zoom: props.disable_zoom,
        disable_pan: props.disable_pan,
        space_to_pan: props.space_to_pan,
        mount_key: viewport.mount_key(),
    }
}

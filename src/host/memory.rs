//! Headless in-memory host.
//!
//! A small element tree with just enough layout to drive the engine:
//! positioned offsets, scroll containers, render scale and margins. Every
//! visual side effect is recorded so callers can assert on it, and timers
//! run off a manual clock advanced with [`MemoryHost::advance`].
//!
//! Selectors understand `tag`, `#id`, `.class`, compounds such as
//! `div.card#main`, `*` and comma-separated lists.

use super::{
    Affordance, ElementResolver, Geometry, HitEntry, HitIndex, InputSource, ListenKind, Scheduler,
    ShadowStyle, ShadowSurface, TimerId,
};
use crate::geometry::{ElementId, Margins, Point, PositionMode, Rect, ScrollMetrics, Size};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tracing::trace;

/// Description of an element to append to the tree.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    name: Option<String>,
    classes: Vec<String>,
    mode: PositionMode,
    layout: Point,
    style: Option<Point>,
    size: Size,
    scale: f64,
    margins: Margins,
    content: Option<Size>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: None,
            classes: Vec::new(),
            mode: PositionMode::Static,
            layout: Point::ZERO,
            style: None,
            size: Size::default(),
            scale: 1.0,
            margins: Margins::default(),
            content: None,
        }
    }

    /// Element id, matched by `#name`.
    pub fn id(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn position(mut self, mode: PositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Absolutely positioned at `(left, top)`.
    pub fn absolute(mut self, left: f64, top: f64) -> Self {
        self.mode = PositionMode::Absolute;
        self.style = Some(Point::new(left, top));
        self
    }

    /// Where normal flow placed the element inside its parent.
    pub fn flow(mut self, x: f64, y: f64) -> Self {
        self.layout = Point::new(x, y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Render scale: the rendered box is `size * scale`.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn margin(mut self, left: f64, top: f64) -> Self {
        self.margins = Margins::new(left, top);
        self
    }

    /// Scrollable content extent, when larger than the box.
    pub fn content(mut self, width: f64, height: f64) -> Self {
        self.content = Some(Size::new(width, height));
        self
    }
}

/// One recorded call to [`Geometry::write_position`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionWrite {
    pub element: ElementId,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    name: Option<String>,
    classes: BTreeSet<String>,
    mode: PositionMode,
    layout: Point,
    style: Option<Point>,
    size: Size,
    scale: f64,
    margins: Margins,
    content: Option<Size>,
    scroll: Point,
    opacity: f64,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn from_spec(spec: ElementSpec, parent: Option<ElementId>) -> Self {
        Self {
            tag: spec.tag,
            name: spec.name,
            classes: spec.classes.into_iter().collect(),
            mode: spec.mode,
            layout: spec.layout,
            style: spec.style,
            size: spec.size,
            scale: spec.scale,
            margins: spec.margins,
            content: spec.content,
            scroll: Point::ZERO,
            opacity: 1.0,
            parent,
            children: Vec::new(),
        }
    }

    fn offset(&self) -> Point {
        match self.mode {
            PositionMode::Absolute | PositionMode::Fixed => self.style.unwrap_or(self.layout),
            PositionMode::Relative => {
                let style = self.style.unwrap_or(Point::ZERO);
                Point::new(self.layout.x + style.x, self.layout.y + style.y)
            }
            PositionMode::Static => self.layout,
        }
    }

    fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        if selector == "*" {
            return true;
        }

        let split = selector.find(['#', '.']).unwrap_or(selector.len());
        let tag = &selector[..split];
        if !tag.is_empty() && tag != "*" && tag != self.tag {
            return false;
        }

        let mut rest = &selector[split..];
        while let Some(kind) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let token = &body[..end];
            let ok = match kind {
                '#' => self.name.as_deref() == Some(token),
                _ => self.classes.contains(token),
            };
            if !ok {
                return false;
            }
            rest = &body[end..];
        }
        true
    }
}

struct Document {
    nodes: HashMap<ElementId, Node>,
    root: ElementId,
    next_id: u64,
    cursor: String,
    writes: Vec<PositionWrite>,
    listeners: BTreeMap<(ElementId, ListenKind), usize>,
    capturing: bool,
}

impl Document {
    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(&element)
    }

    fn offset_parent(&self, element: ElementId) -> Option<ElementId> {
        let mut current = self.node(element)?.parent;
        while let Some(id) = current {
            let node = self.node(id)?;
            if id == self.root || node.mode != PositionMode::Static {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    fn page_offset(&self, element: ElementId) -> Point {
        let mut total = Point::ZERO;
        let mut current = Some(element);
        while let Some(id) = current {
            let Some(node) = self.node(id) else { break };
            let offset = node.offset();
            total.x += offset.x;
            total.y += offset.y;
            current = self.offset_parent(id);
        }
        total
    }

    fn ancestor_scroll(&self, element: ElementId) -> Point {
        let mut total = Point::ZERO;
        let mut current = self.node(element).and_then(|n| n.parent);
        while let Some(id) = current {
            let Some(node) = self.node(id) else { break };
            total.x += node.scroll.x;
            total.y += node.scroll.y;
            current = node.parent;
        }
        total
    }

    fn client_rect(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::default();
        };
        let page = self.page_offset(element);
        let scroll = if node.mode == PositionMode::Fixed {
            Point::ZERO
        } else {
            self.ancestor_scroll(element)
        };
        Rect::new(
            page.x - scroll.x,
            page.y - scroll.y,
            node.size.width * node.scale,
            node.size.height * node.scale,
        )
    }

    /// Preorder walk below `from`, `from` included.
    fn preorder(&self, from: ElementId) -> Vec<(ElementId, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(from, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push((id, depth));
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }

    fn detach(&mut self, element: ElementId) {
        let parent = self.node(element).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != element);
        }
        if let Some(node) = self.nodes.get_mut(&element) {
            node.parent = None;
        }
    }
}

struct Timer {
    period: Duration,
    due: Duration,
    callback: Option<Box<dyn FnMut()>>,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
}

/// In-memory implementation of every host capability.
pub struct MemoryHost {
    doc: RefCell<Document>,
    clock: RefCell<Clock>,
}

impl MemoryHost {
    /// Empty document whose root (`body`) measures `width` x `height`.
    pub fn new(width: f64, height: f64) -> Self {
        let root = ElementId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node::from_spec(
                ElementSpec::new("body").position(PositionMode::Relative).size(width, height),
                None,
            ),
        );
        Self {
            doc: RefCell::new(Document {
                nodes,
                root,
                next_id: 1,
                cursor: String::new(),
                writes: Vec::new(),
                listeners: BTreeMap::new(),
                capturing: false,
            }),
            clock: RefCell::new(Clock::default()),
        }
    }

    pub fn root(&self) -> ElementId {
        self.doc.borrow().root
    }

    /// Append a new element under `parent` and return its id.
    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let mut doc = self.doc.borrow_mut();
        let id = ElementId(doc.next_id);
        doc.next_id += 1;
        doc.nodes.insert(id, Node::from_spec(spec, Some(parent)));
        if let Some(parent) = doc.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        id
    }

    pub fn exists(&self, element: ElementId) -> bool {
        self.doc.borrow().nodes.contains_key(&element)
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.doc.borrow().node(element).and_then(|n| n.parent)
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.doc
            .borrow()
            .node(element)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Last written style position, if any.
    pub fn style_position(&self, element: ElementId) -> Option<Point> {
        self.doc.borrow().node(element).and_then(|n| n.style)
    }

    pub fn position_writes(&self) -> Vec<PositionWrite> {
        self.doc.borrow().writes.clone()
    }

    pub fn writes_for(&self, element: ElementId) -> Vec<PositionWrite> {
        self.doc
            .borrow()
            .writes
            .iter()
            .filter(|w| w.element == element)
            .copied()
            .collect()
    }

    pub fn clear_writes(&self) {
        self.doc.borrow_mut().writes.clear();
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.doc
            .borrow()
            .node(element)
            .is_some_and(|n| n.classes.contains(class))
    }

    pub fn opacity(&self, element: ElementId) -> Option<f64> {
        self.doc.borrow().node(element).map(|n| n.opacity)
    }

    pub fn position_mode_of(&self, element: ElementId) -> Option<PositionMode> {
        self.doc.borrow().node(element).map(|n| n.mode)
    }

    /// How many times `element` is currently listened for `kind`.
    pub fn listener_count(&self, element: ElementId, kind: ListenKind) -> usize {
        self.doc
            .borrow()
            .listeners
            .get(&(element, kind))
            .copied()
            .unwrap_or(0)
    }

    /// Every element with at least one listener of `kind`.
    pub fn listening(&self, kind: ListenKind) -> Vec<ElementId> {
        self.doc
            .borrow()
            .listeners
            .keys()
            .filter(|(_, k)| *k == kind)
            .map(|(element, _)| *element)
            .collect()
    }

    pub fn is_capturing(&self) -> bool {
        self.doc.borrow().capturing
    }

    pub fn scroll_position(&self, element: ElementId) -> Point {
        self.doc
            .borrow()
            .node(element)
            .map(|n| n.scroll)
            .unwrap_or_default()
    }

    pub fn set_scale(&self, element: ElementId, scale: f64) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(&element) {
            node.scale = scale;
        }
    }

    pub fn set_size(&self, element: ElementId, width: f64, height: f64) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(&element) {
            node.size = Size::new(width, height);
        }
    }

    /// Time elapsed on the manual clock.
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    pub fn active_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Move the clock forward, firing due timers in order. Callbacks may
    /// set or clear timers, including their own.
    pub fn advance(&self, by: Duration) {
        let target = self.clock.borrow().now + by;
        loop {
            let next = {
                let clock = self.clock.borrow();
                clock
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(id, timer)| (timer.due, **id))
                    .map(|(id, _)| *id)
            };
            let Some(id) = next else { break };

            let callback = {
                let mut clock = self.clock.borrow_mut();
                let Some(timer) = clock.timers.get_mut(&id) else { break };
                let due = timer.due;
                timer.due += timer.period;
                let callback = timer.callback.take();
                clock.now = due;
                callback
            };

            if let Some(mut callback) = callback {
                trace!(timer = id.0, "timer fired");
                callback();
                if let Some(timer) = self.clock.borrow_mut().timers.get_mut(&id) {
                    timer.callback = Some(callback);
                }
            }
        }
        self.clock.borrow_mut().now = target;
    }
}

impl Geometry for MemoryHost {
    fn box_size(&self, element: ElementId) -> Size {
        self.doc
            .borrow()
            .node(element)
            .map(|n| n.size)
            .unwrap_or_default()
    }

    fn client_rect(&self, element: ElementId) -> Rect {
        self.doc.borrow().client_rect(element)
    }

    fn offset(&self, element: ElementId) -> Point {
        self.doc
            .borrow()
            .node(element)
            .map(Node::offset)
            .unwrap_or_default()
    }

    fn position_mode(&self, element: ElementId) -> PositionMode {
        self.doc
            .borrow()
            .node(element)
            .map(|n| n.mode)
            .unwrap_or_default()
    }

    fn margins(&self, element: ElementId) -> Margins {
        self.doc
            .borrow()
            .node(element)
            .map(|n| n.margins)
            .unwrap_or_default()
    }

    fn offset_parent(&self, element: ElementId) -> Option<ElementId> {
        self.doc.borrow().offset_parent(element)
    }

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics {
        let doc = self.doc.borrow();
        let Some(node) = doc.node(element) else {
            return ScrollMetrics::default();
        };
        let content = node.content.unwrap_or(node.size);
        ScrollMetrics {
            scroll_width: content.width.max(node.size.width),
            scroll_height: content.height.max(node.size.height),
            client_width: node.size.width,
            client_height: node.size.height,
            offset_width: node.size.width,
            offset_height: node.size.height,
            scroll_left: node.scroll.x,
            scroll_top: node.scroll.y,
        }
    }

    fn page_offset(&self, element: ElementId) -> Point {
        self.doc.borrow().page_offset(element)
    }

    fn write_position(&self, element: ElementId, left: f64, top: f64) {
        let mut doc = self.doc.borrow_mut();
        doc.writes.push(PositionWrite { element, left, top });
        if let Some(node) = doc.nodes.get_mut(&element) {
            node.style = Some(Point::new(left, top));
        }
    }

    fn scroll_to(&self, element: ElementId, left: Option<f64>, top: Option<f64>) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(&element) {
            if let Some(left) = left {
                node.scroll.x = left;
            }
            if let Some(top) = top {
                node.scroll.y = top;
            }
        }
    }
}

impl ElementResolver for MemoryHost {
    fn query(&self, selector: &str, scope: Option<ElementId>) -> Vec<ElementId> {
        let doc = self.doc.borrow();
        let walk = match scope {
            // Like querySelectorAll: the scope element itself never matches.
            Some(scope) => doc.preorder(scope).into_iter().skip(1).collect::<Vec<_>>(),
            None => doc.preorder(doc.root),
        };
        walk.into_iter()
            .map(|(id, _)| id)
            .filter(|id| {
                doc.node(*id)
                    .is_some_and(|node| selector.split(',').any(|part| node.matches(part)))
            })
            .collect()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let doc = self.doc.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = doc.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn element_at(&self, client: Point) -> Option<ElementId> {
        let doc = self.doc.borrow();
        let entries = doc
            .preorder(doc.root)
            .into_iter()
            .enumerate()
            .map(|(order, (id, depth))| HitEntry::new(id, depth, order, doc.client_rect(id)));
        HitIndex::build(entries).topmost(client)
    }
}

impl InputSource for MemoryHost {
    fn listen(&self, element: ElementId, kind: ListenKind) {
        *self.doc.borrow_mut().listeners.entry((element, kind)).or_default() += 1;
    }

    fn unlisten(&self, element: ElementId, kind: ListenKind) {
        let mut doc = self.doc.borrow_mut();
        if let Some(count) = doc.listeners.get_mut(&(element, kind)) {
            *count -= 1;
            if *count == 0 {
                doc.listeners.remove(&(element, kind));
            }
        }
    }

    fn capture_pointer(&self) {
        self.doc.borrow_mut().capturing = true;
    }

    fn release_pointer(&self) {
        self.doc.borrow_mut().capturing = false;
    }
}

impl Affordance for MemoryHost {
    fn add_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(&element) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(&element) {
            node.classes.remove(class);
        }
    }

    fn cursor(&self) -> String {
        self.doc.borrow().cursor.clone()
    }

    fn set_cursor(&self, cursor: &str) {
        self.doc.borrow_mut().cursor = cursor.to_string();
    }
}

impl Scheduler for MemoryHost {
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> TimerId {
        let mut clock = self.clock.borrow_mut();
        let id = TimerId(clock.next_id);
        clock.next_id += 1;
        // A zero period would never let the clock advance.
        let period = period.max(Duration::from_millis(1));
        let due = clock.now + period;
        clock.timers.insert(
            id,
            Timer {
                period,
                due,
                callback: Some(callback),
            },
        );
        id
    }

    fn clear_interval(&self, timer: TimerId) {
        self.clock.borrow_mut().timers.remove(&timer);
    }
}

impl ShadowSurface for MemoryHost {
    fn create_shadow(&self, source: ElementId, style: &ShadowStyle) -> ElementId {
        let mut doc = self.doc.borrow_mut();
        let id = ElementId(doc.next_id);
        doc.next_id += 1;

        let mut node = match doc.node(source) {
            Some(source) => Node {
                parent: None,
                children: Vec::new(),
                name: None,
                ..source.clone()
            },
            None => Node::from_spec(ElementSpec::new("div"), None),
        };
        node.mode = if style.fixed {
            PositionMode::Fixed
        } else {
            PositionMode::Absolute
        };
        node.size = style.size;
        node.opacity = style.opacity;
        if let Some(class) = &style.class {
            node.classes.extend(super::class_names(class).map(str::to_string));
        }
        doc.nodes.insert(id, node);
        id
    }

    fn attach_shadow(&self, shadow: ElementId, sibling: ElementId) {
        let mut doc = self.doc.borrow_mut();
        let Some(parent) = doc.node(sibling).and_then(|n| n.parent) else {
            return;
        };
        doc.detach(shadow);
        if let Some(node) = doc.nodes.get_mut(&shadow) {
            node.parent = Some(parent);
        }
        if let Some(parent) = doc.nodes.get_mut(&parent) {
            parent.children.push(shadow);
        }
    }

    fn remove_element(&self, element: ElementId) {
        let mut doc = self.doc.borrow_mut();
        if element == doc.root {
            return;
        }
        doc.detach(element);
        let doomed: Vec<ElementId> = doc.preorder(element).into_iter().map(|(id, _)| id).collect();
        for id in doomed {
            doc.nodes.remove(&id);
        }
    }
}

//! Element descriptors - the "new tree" side of reconciliation.
//!
//! An [`Element`] describes what a node should look like after this pass. It
//! is cheap to clone (every field is `Rc`-backed) because the differ copies
//! descriptors into fibers on every render.
//!
//! ```ignore
//! let list = Element::host("ul").children(
//!     items.iter().map(|item| Element::host("li").key(item.id).prop("label", item.name.as_str())),
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::fiber::NodeHandle;
use crate::hooks::Hooks;

/// Tag of host nodes produced from text.
pub const TEXT_TAG: &str = "#text";

/// Tag of the synthetic root fiber created by `render`.
pub const ROOT_TAG: &str = "#root";

/// Tag that switches host creation into the SVG namespace.
pub const SVG_TAG: &str = "svg";

// =============================================================================
// Key
// =============================================================================

/// Explicit identity hint used to match children across reorderings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

/// Immutable attribute map shared between a descriptor and its fiber.
///
/// Props never take part in matching; the renderer diffs `props` against
/// `last_props` at commit time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attrs: Rc<BTreeMap<Rc<str>, PropValue>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    /// Look up a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up an integer attribute.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.attrs.get(name) {
            Some(PropValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(k, v)| (&**k, v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Copy-on-write insert.
    pub fn with(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.attrs).insert(Rc::from(name), value.into());
        self
    }
}

// =============================================================================
// Types
// =============================================================================

/// Render function of a component: props, the descriptor children it was
/// given, and its hook store.
pub type RenderFn = dyn Fn(&Props, &[Element], &mut Hooks) -> Vec<Element>;

/// A component: a named render function.
///
/// Two components are the same type iff they share the same function
/// allocation, so clone a `Component` rather than building it twice.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(
        name: &'static str,
        render: impl Fn(&Props, &[Element], &mut Hooks) -> Vec<Element> + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn call(&self, props: &Props, children: &[Element], hooks: &mut Hooks) -> Vec<Element> {
        (self.render)(props, children, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable pointers are not unique.
        std::ptr::addr_eq(Rc::as_ptr(&self.render), Rc::as_ptr(&other.render))
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

/// What kind of node a descriptor or fiber is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// A host node identified by its tag.
    Host(Rc<str>),
    /// A component invocation.
    Component(Component),
}

// =============================================================================
// NodeRef
// =============================================================================

/// Callback bound to a host fiber's node.
///
/// The commit calls it with the node once the node is attached and with
/// `None` when its fiber is detached. It stays with the fiber across reuse.
#[derive(Clone)]
pub struct NodeRef(Rc<dyn Fn(Option<NodeHandle>)>);

impl NodeRef {
    pub fn new(callback: impl Fn(Option<NodeHandle>) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn set(&self, node: Option<NodeHandle>) {
        (self.0)(node)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeRef")
    }
}

// =============================================================================
// Element
// =============================================================================

/// A descriptor of one node in the newly computed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub ty: ElementType,
    pub key: Option<Key>,
    pub props: Props,
    pub children: Rc<[Element]>,
    pub node_ref: Option<NodeRef>,
}

impl Element {
    /// Host node with the given tag.
    pub fn host(tag: &str) -> Self {
        Self::new(ElementType::Host(Rc::from(tag)))
    }

    /// Text node. The content lives in the `text` prop.
    pub fn text(content: impl Into<PropValue>) -> Self {
        Self::host(TEXT_TAG).prop("text", content)
    }

    /// Component invocation.
    pub fn component(component: &Component) -> Self {
        Self::new(ElementType::Component(component.clone()))
    }

    fn new(ty: ElementType) -> Self {
        Self {
            ty,
            key: None,
            props: Props::default(),
            children: Rc::from(Vec::new()),
            node_ref: None,
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props = self.props.with(name, value);
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }
}

//! Integration tests for compiling and rendering templates.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{json, Value};
use trellis_dom::Tree;
use trellis_runtime::{
    Component, ComponentFactory, Evaluator, ExportValue, Namespace, PathEvaluator, RenderOptions,
    RuntimeError, RuntimeResult,
};

struct Widget {
    container: trellis_dom::NodeId,
}

impl Component for Widget {
    fn container(&self) -> trellis_dom::NodeId {
        self.container
    }
}

/// Builds `<button>{label}</button>` inside a fragment container.
struct WidgetFactory;

impl ComponentFactory for WidgetFactory {
    fn create(&self, tree: &mut Tree, params: Option<&Value>) -> RuntimeResult<Rc<dyn Component>> {
        let label = params
            .and_then(|p| p.get("label"))
            .and_then(Value::as_str)
            .unwrap_or("go")
            .to_string();
        let container = tree.create_fragment();
        let button = tree.create_element("button");
        let text = tree.create_text(label);
        tree.append_child(button, text);
        tree.append_child(container, button);
        Ok(Rc::new(Widget { container }))
    }
}

#[test]
fn test_literal_template_exports_only_root() {
    let mut ns = Namespace::new();
    ns.register("plain", "hello <b>world</b> & 1 < 2").unwrap();

    let result = ns.render("plain", None, &RenderOptions::new()).unwrap();
    assert_eq!(result.exports.names(), vec!["root"]);
    assert_eq!(result.html(), "hello <b>world</b> & 1 < 2");
}

#[test]
fn test_escaper_roundtrip_through_render() {
    let mut ns = Namespace::new();
    let body = "it's\n\ta 'test' with a back\\slash\r\nend";
    ns.register("raw", body).unwrap();

    let result = ns.render("raw", None, &RenderOptions::new()).unwrap();
    assert_eq!(result.html(), body);
}

#[test]
fn test_escape_directive_single_pass_mapping() {
    let mut ns = Namespace::new();
    ns.register("esc", "<p>{{- this.v }}</p>").unwrap();

    let data = json!({"v": "<a>&\"'/"});
    let result = ns.render("esc", Some(&data), &RenderOptions::new()).unwrap();
    assert_eq!(result.html(), "<p>&lt;a&gt;&amp;&quot;&#x27;&#x2F;</p>");
}

#[test]
fn test_interpolate_values() {
    let mut ns = Namespace::new();
    ns.register("count", "{{= this.n }} of {{= this.total }} ({{= this.missing }})")
        .unwrap();

    let data = json!({"n": 3, "total": 10});
    let result = ns.render("count", Some(&data), &RenderOptions::new()).unwrap();
    // Missing fields interpolate as the empty string.
    assert_eq!(result.html(), "3 of 10 ()");
}

#[test]
fn test_array_export_accumulates_in_document_order() {
    let mut ns = Namespace::new();
    ns.register(
        "list",
        concat!(
            r#"<ul><li data-export-id="{{@ item[] }}">a</li>"#,
            r#"<li data-export-id="{{@ item[] }}">b</li></ul>"#,
        ),
    )
    .unwrap();

    let result = ns.render("list", None, &RenderOptions::new()).unwrap();
    let items = result
        .exports
        .get("item")
        .and_then(ExportValue::as_list)
        .unwrap();
    assert_eq!(items.len(), 2);
    let a = items[0].as_node().unwrap();
    let b = items[1].as_node().unwrap();
    assert_eq!(result.tree.serialize(a), "<li>a</li>");
    assert_eq!(result.tree.serialize(b), "<li>b</li>");
    // The marking attribute is stripped during collection.
    assert_eq!(result.tree.attribute(a, "data-export-id"), None);
    assert_eq!(result.html(), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_duplicate_non_array_export_fails_at_render() {
    let mut ns = Namespace::new();
    ns.register(
        "dup",
        r#"<b data-export-id="{{@ x }}">1</b><b data-export-id="{{@ x }}">2</b>"#,
    )
    .unwrap();

    assert!(matches!(
        ns.render("dup", None, &RenderOptions::new()),
        Err(RuntimeError::DuplicateExport(key)) if key == "x"
    ));
}

#[test]
fn test_unknown_export_key_fails_at_render() {
    // A literal (non-directive) export attribute never reaches the
    // dispatch table, so collection trips the unknown-key arm.
    let mut ns = Namespace::new();
    ns.register("stale", r#"<b data-export-id="ghost">x</b>"#)
        .unwrap();

    assert!(matches!(
        ns.render("stale", None, &RenderOptions::new()),
        Err(RuntimeError::UnknownExportKey(key)) if key == "ghost"
    ));
}

#[test]
fn test_single_node_export() {
    let mut ns = Namespace::new();
    ns.register("tagged", r#"<div data-export-id="{{@ box }}">content</div>"#)
        .unwrap();

    let result = ns.render("tagged", None, &RenderOptions::new()).unwrap();
    let node = result
        .exports
        .get("box")
        .and_then(ExportValue::as_node)
        .unwrap();
    assert_eq!(result.tree.serialize(node), "<div>content</div>");
    assert_eq!(result.tree.attribute(node, "data-export-id"), None);
}

#[test]
fn test_partial_receives_params_as_data() {
    let mut ns = Namespace::new();
    ns.register("child", "<em>{{= this.name }}</em>").unwrap();
    ns.register("parent", "<div>{{# child, this.user, kid }}</div>")
        .unwrap();

    let data = json!({"user": {"name": "Zoe"}});
    let result = ns.render("parent", Some(&data), &RenderOptions::new()).unwrap();
    assert_eq!(result.html(), "<div><em>Zoe</em></div>");

    // The partial's own result map is exported with `root` detached.
    let kid = result.exports.get("kid").and_then(ExportValue::as_map).unwrap();
    assert!(!kid.contains("root"));
    assert!(kid.is_empty());
}

#[test]
fn test_partial_exports_surface_in_child_map() {
    let mut ns = Namespace::new();
    ns.register("child", r#"<i data-export-id="{{@ mark }}">x</i>"#)
        .unwrap();
    ns.register("parent", "{{# child, false, kid }}").unwrap();

    let result = ns.render("parent", None, &RenderOptions::new()).unwrap();
    let kid = result.exports.get("kid").and_then(ExportValue::as_map).unwrap();
    let mark = kid.get("mark").and_then(ExportValue::as_node).unwrap();
    assert_eq!(result.tree.serialize(mark), "<i>x</i>");
}

#[test]
fn test_include_ordering_partial_before_component() {
    let mut ns = Namespace::new();
    ns.register("inner", "<i>deep</i>").unwrap();
    ns.register("outer", "<div>{{# inner }}</div>").unwrap();
    ns.register(
        "page",
        "<main>{{# outer, false, part }}{{% widget, {label: 'hi'}, w }}</main>",
    )
    .unwrap();
    ns.register_component("widget", Arc::new(WidgetFactory));

    let result = ns.render("page", None, &RenderOptions::new()).unwrap();
    // The partial's subtree, including its own nested include, is fully
    // resolved before the component marker; siblings keep their order.
    assert_eq!(
        result.html(),
        "<main><div><i>deep</i></div><button>hi</button></main>"
    );
    assert!(result.exports.get("part").and_then(ExportValue::as_map).is_some());
    assert!(result
        .exports
        .get("w")
        .and_then(ExportValue::as_component)
        .is_some());
}

#[test]
fn test_component_hooks_fire_around_insertion() {
    let mut ns = Namespace::new();
    ns.register("page", "{{% widget }}").unwrap();
    ns.register_component("widget", Arc::new(WidgetFactory));

    let log = Rc::new(RefCell::new(Vec::<&str>::new()));
    let before_log = log.clone();
    let after_log = log.clone();
    let options = RenderOptions::new()
        .before_append_component(move |_| before_log.borrow_mut().push("before"))
        .after_append_component(move |_| after_log.borrow_mut().push("after"));

    let result = ns.render("page", None, &options).unwrap();
    assert_eq!(result.html(), "<button>go</button>");
    assert_eq!(*log.borrow(), vec!["before", "after"]);
}

#[test]
fn test_hooks_not_fired_for_partials() {
    let mut ns = Namespace::new();
    ns.register("inner", "x").unwrap();
    ns.register("page", "{{# inner }}").unwrap();

    let fired = Rc::new(RefCell::new(false));
    let flag = fired.clone();
    let options =
        RenderOptions::new().before_append_component(move |_| *flag.borrow_mut() = true);

    ns.render("page", None, &options).unwrap();
    assert!(!*fired.borrow());
}

#[test]
fn test_unknown_partial_reference_fails() {
    let mut ns = Namespace::new();
    ns.register("page", "{{# ghost }}").unwrap();
    assert!(matches!(
        ns.render("page", None, &RenderOptions::new()),
        Err(RuntimeError::TemplateNotFound(name)) if name == "ghost"
    ));
}

#[test]
fn test_unknown_component_reference_fails() {
    let mut ns = Namespace::new();
    ns.register("page", "{{% ghost }}").unwrap();
    assert!(matches!(
        ns.render("page", None, &RenderOptions::new()),
        Err(RuntimeError::ComponentNotFound(name)) if name == "ghost"
    ));
}

#[test]
fn test_evaluate_block_requires_capable_evaluator() {
    let mut ns = Namespace::new();
    ns.register("ev", "a{{ shout(); }}b").unwrap();

    assert!(matches!(
        ns.render("ev", None, &RenderOptions::new()),
        Err(RuntimeError::HostCode(_))
    ));
}

/// Delegates expressions to the default evaluator and handles one known
/// statement in blocks.
struct ShoutEvaluator;

impl Evaluator for ShoutEvaluator {
    fn expression(&self, code: &str, data: Option<&Value>) -> RuntimeResult<Value> {
        PathEvaluator.expression(code, data)
    }

    fn block(&self, code: &str, _data: Option<&Value>, out: &mut String) -> RuntimeResult<()> {
        if code.contains("shout") {
            out.push_str("LOUD");
        }
        Ok(())
    }
}

#[test]
fn test_evaluate_block_with_custom_evaluator() {
    let mut ns = Namespace::new();
    ns.register("ev", "a{{ shout(); }}b{{= this.x }}").unwrap();

    let options = RenderOptions::new().with_evaluator(ShoutEvaluator);
    let data = json!({"x": "!"});
    let result = ns.render("ev", Some(&data), &options).unwrap();
    assert_eq!(result.html(), "aLOUDb!");
}

/// Emits a marker for an id that was never deferred.
struct Forger;

impl Evaluator for Forger {
    fn expression(&self, code: &str, data: Option<&Value>) -> RuntimeResult<Value> {
        PathEvaluator.expression(code, data)
    }

    fn block(&self, _code: &str, _data: Option<&Value>, out: &mut String) -> RuntimeResult<()> {
        out.push_str("<!--partial424242-->");
        Ok(())
    }
}

#[test]
fn test_marker_without_table_entry_is_fatal() {
    let mut ns = Namespace::new();
    ns.register("forged", "{{ block }}").unwrap();

    let options = RenderOptions::new().with_evaluator(Forger);
    assert!(matches!(
        ns.render("forged", None, &options),
        Err(RuntimeError::MissingInclude(424242))
    ));
}

/// Emits an unterminated open tag so the following include marker is
/// swallowed by the markup parser.
struct Saboteur;

impl Evaluator for Saboteur {
    fn expression(&self, code: &str, data: Option<&Value>) -> RuntimeResult<Value> {
        PathEvaluator.expression(code, data)
    }

    fn block(&self, _code: &str, _data: Option<&Value>, out: &mut String) -> RuntimeResult<()> {
        out.push_str("<div ");
        Ok(())
    }
}

#[test]
fn test_unconsumed_table_entry_is_fatal() {
    let mut ns = Namespace::new();
    ns.register("inner", "x").unwrap();
    ns.register("sab", "{{ block }}{{# inner }}").unwrap();

    let options = RenderOptions::new().with_evaluator(Saboteur);
    assert!(matches!(
        ns.render("sab", None, &options),
        Err(RuntimeError::UnresolvedIncludes(1))
    ));
}

#[test]
fn test_repeated_renders_stay_independent() {
    let mut ns = Namespace::new();
    ns.register("inner", "<i>i</i>").unwrap();
    ns.register("page", "<div>{{# inner }}</div>").unwrap();

    for _ in 0..3 {
        let result = ns.render("page", None, &RenderOptions::new()).unwrap();
        assert_eq!(result.html(), "<div><i>i</i></div>");
    }
}

//! Definition fixtures shared by tests across the workspace.
//!
//! `WIDGETS` imports `COMMON` as `common: common.yml`, so the two must be
//! loaded from the same directory.

/// A complete file exercising every definition kind.
pub const WIDGETS: &str = r#"
types:
  conjure-imports:
    common: common.yml
  imports:
    JavaLong:
      base-type: safelong
      external:
        java: java.lang.Long
  definitions:
    default-package: com.example.widgets
    objects:
      WidgetId:
        alias: string
      Color:
        values:
          - RED
          - value: GREEN
            docs: The color of grass.
      Widget:
        docs: A widget.
        fields:
          id: WidgetId
          color:
            type: Color
            default: RED
          price: optional<common.Money>
          count: JavaLong
          tags: map<string, list<Color>>
      Shape:
        union:
          circle: double
          square: double
    errors:
      WidgetNotFound:
        namespace: Widgets
        code: NOT_FOUND
        safe-args:
          widgetId: WidgetId
services:
  WidgetService:
    name: Widget Service
    package: com.example.widgets.service
    default-auth: header
    base-path: /widgets
    endpoints:
      getWidget:
        http: GET /{widgetId}
        args:
          widgetId: WidgetId
          trace:
            type: optional<string>
            param-type: header
            param-id: X-Trace-Id
        returns: Widget
      listWidgets:
        http: GET /
        auth: none
        args:
          pageSize:
            type: optional<integer>
            param-type: query
        returns: list<Widget>
      createWidget:
        http: POST /
        args:
          widget: Widget
        markers:
          - common.Audited
"#;

/// Imported by `WIDGETS`.
pub const COMMON: &str = r#"
types:
  definitions:
    default-package: com.example.common
    objects:
      Money:
        fields:
          amount: double
          currency: string
      Audited:
        alias: any
"#;

/// A service named `Foo` in package `com.a`.
pub const SERVICE_FOO_A: &str = r#"
services:
  Foo:
    package: com.a
    endpoints:
      ping:
        http: GET /ping
"#;

/// A service named `Foo` in package `com.b`.
pub const SERVICE_FOO_B: &str = r#"
services:
  Foo:
    package: com.b
    endpoints:
      pong:
        http: GET /pong
"#;

/// An error argument whose default is not a value of its enum.
pub const ERROR_WITH_BAD_DEFAULT: &str = r#"
types:
  definitions:
    default-package: com.example
    objects:
      Color:
        values:
          - RED
    errors:
      BadColor:
        namespace: Colors
        code: INVALID_ARGUMENT
        safe-args:
          color:
            type: Color
            default: BLUE
"#;

/// `optional<MaybeName>` where `MaybeName` is itself an optional.
pub const NESTED_OPTIONAL_ALIAS: &str = r#"
types:
  definitions:
    default-package: com.example
    objects:
      MaybeName:
        alias: optional<string>
      Holder:
        fields:
          name: optional<MaybeName>
"#;

/// `fooBar` and `foo-bar` normalize to the same field.
pub const COLLIDING_FIELDS: &str = r#"
types:
  definitions:
    default-package: com.example
    objects:
      Pair:
        fields:
          fooBar: string
          foo-bar: string
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;

    #[test]
    fn test_fixtures_parse() {
        for (path, yaml) in [
            ("widgets.yml", WIDGETS),
            ("common.yml", COMMON),
            ("a.yml", SERVICE_FOO_A),
            ("b.yml", SERVICE_FOO_B),
            ("errors.yml", ERROR_WITH_BAD_DEFAULT),
            ("nested.yml", NESTED_OPTIONAL_ALIAS),
            ("pair.yml", COLLIDING_FIELDS),
        ] {
            assert!(SourceFile::from_yaml(path, yaml).is_ok(), "{} did not parse", path);
        }
    }

    #[test]
    fn test_widgets_declares_common_import() {
        let file = SourceFile::from_yaml("api/widgets.yml", WIDGETS).unwrap();
        let imports: Vec<_> = file.imports().collect();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].0, "common");
        assert!(imports[0].1.ends_with("api/common.yml"));
    }
}

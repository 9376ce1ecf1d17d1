//! End-to-end generation tests.
//!
//! Drives the generator tree, the import collector and the environment
//! together the way a code generator uses them: build a unit, render it,
//! assert the emitted text and its import block as one artifact.

use javaforge::{
    AnnotationGenerator, EnvironmentBuilder, FieldGenerator, ForgeError, MethodGenerator,
    MethodParameterGenerator, PrimaryTypeGenerator, TypeGenerator,
};

fn env() -> javaforge::Environment {
    EnvironmentBuilder::new()
        .with_running_classpath(false)
        .build()
        .unwrap()
}

#[test]
fn colliding_simple_names_keep_first_registrant_imported() {
    let env = env();
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("org.demo")
        .with_element_name("Holder")
        .with_field(
            FieldGenerator::create()
                .as_private()
                .with_data_type("java.util.List<java.lang.String>")
                .with_element_name("m_names"),
        )
        .with_field(
            FieldGenerator::create()
                .as_private()
                .with_data_type("com.acme.List")
                .with_element_name("m_acmeList"),
        );
    let src = unit.to_compilation_unit_source(&env).unwrap();

    // the first registrant owns the simple name, the loser stays qualified
    assert!(src.contains("private List<String> m_names;"));
    assert!(src.contains("private com.acme.List m_acmeList;"));
    assert!(src.contains("import java.util.List;\n"));
    assert!(!src.contains("import com.acme.List;"));
}

#[test]
fn rendering_twice_is_byte_identical() {
    let env = env();
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("org.demo")
        .with_element_name("Stable")
        .with_annotation(AnnotationGenerator::create_generated("FormGenerator"))
        .with_super_class("java.util.AbstractMap")
        .with_interface("java.io.Serializable")
        .with_field(FieldGenerator::create_serial_version_uid())
        .with_method(MethodGenerator::create().as_public().with_element_name("Stable"))
        .with_method(
            MethodGenerator::create()
                .as_public()
                .with_return_type("java.util.Optional<java.lang.String>")
                .with_element_name("name"),
        );

    let first = unit.to_compilation_unit_source(&env).unwrap();
    let second = unit.to_compilation_unit_source(&env).unwrap();
    assert_eq!(first, second);
}

#[test]
fn member_categories_override_insertion_and_name_order() {
    let env = env();
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("org.demo")
        .with_element_name("Ordered")
        .with_field(FieldGenerator::create().with_element_name("a").with_data_type("int"))
        .with_field(
            FieldGenerator::create()
                .as_static()
                .as_final()
                .with_element_name("B")
                .with_data_type("int"),
        )
        .with_method(
            MethodGenerator::create()
                .as_public()
                .with_return_type("void")
                .with_element_name("plainOperation"),
        )
        .with_method(MethodGenerator::create().as_public().with_element_name("Ordered"));
    let src = unit.to_compilation_unit_source(&env).unwrap();

    // static-final precedes plain, despite insertion and alphabetical order
    let b_pos = src.find("static final int B;").unwrap();
    let a_pos = src.find("int a;").unwrap();
    assert!(b_pos < a_pos);

    // fields precede methods, constructors precede plain methods
    let ctor_pos = src.find("public Ordered()").unwrap();
    let method_pos = src.find("public void plainOperation()").unwrap();
    assert!(a_pos < ctor_pos);
    assert!(ctor_pos < method_pos);
}

#[test]
fn import_block_is_grouped_with_blank_separators() {
    let env = env();
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("com.demo")
        .with_element_name("Grouped")
        .with_interface("java.io.Serializable")
        .with_field(
            FieldGenerator::create()
                .as_private()
                .with_data_type("javax.sql.DataSource")
                .with_element_name("m_dataSource"),
        )
        .with_field(
            FieldGenerator::create()
                .as_private()
                .with_data_type("org.demo.Widget")
                .with_element_name("m_widget"),
        );
    let src = unit.to_compilation_unit_source(&env).unwrap();

    let expected = "import java.io.Serializable;\n\
                    \n\
                    import javax.sql.DataSource;\n\
                    \n\
                    import org.demo.Widget;\n";
    assert!(src.contains(expected), "unexpected import block in:\n{src}");
}

#[test]
fn configuration_errors_surface_before_any_output() {
    let env = env();
    // a field without a data type deep in the tree
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("org.demo")
        .with_element_name("Broken")
        .with_type(
            TypeGenerator::create()
                .as_public()
                .with_element_name("Inner")
                .with_field(FieldGenerator::create().with_element_name("x")),
        );
    let err = unit.to_compilation_unit_source(&env).unwrap_err();
    assert!(matches!(err, ForgeError::InvalidGenerator { .. }));
}

#[test]
fn generated_unit_parses_back_to_equivalent_declarations() {
    let env = env();
    let unit = PrimaryTypeGenerator::create()
        .with_package_name("org.demo")
        .with_element_name("RoundTrip")
        .with_interface("java.io.Serializable")
        .with_field(FieldGenerator::create_serial_version_uid())
        .with_method(
            MethodGenerator::create()
                .as_public()
                .with_return_type("java.lang.String")
                .with_element_name("describe")
                .with_parameter(
                    MethodParameterGenerator::create()
                        .with_data_type("int")
                        .with_element_name("count"),
                )
                .with_body(|b| {
                    b.append("return ").string_literal("x").append(";");
                }),
        );
    let src = unit.to_compilation_unit_source(&env).unwrap();

    // the emitted unit is scannable and structurally faithful
    let parsed = javaforge::parse::parse_compilation_unit(&src, "RoundTrip.java", false).unwrap();
    assert_eq!(parsed.package.as_deref(), Some("org.demo"));
    let decl = parsed.primary_type().unwrap();
    assert_eq!(decl.simple_name, "RoundTrip");
    assert_eq!(decl.interfaces.len(), 1);
    assert!(decl.field("serialVersionUID").is_some());
    let describe = decl.methods_named("describe").next().unwrap();
    assert_eq!(describe.parameters.len(), 1);
}

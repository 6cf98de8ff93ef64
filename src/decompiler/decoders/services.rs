//! Services, ODBC and qualified component publishing

use super::{copy, set_yes, DecodeFn};
use crate::attributes::{unknown_bits, ServiceEvents};
use crate::decompiler::context::Context;
use crate::names::split_multi_string;
use crate::types::Table;
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("ODBCAttribute", decompile_odbc_attribute_table);
    map.insert("ODBCDataSource", decompile_odbc_data_source_table);
    map.insert("ODBCDriver", decompile_odbc_driver_table);
    map.insert("ODBCSourceAttribute", decompile_odbc_source_attribute_table);
    map.insert("ODBCTranslator", decompile_odbc_translator_table);
    map.insert("PublishComponent", decompile_publish_component_table);
    map.insert("ServiceControl", decompile_service_control_table);
    map.insert("ServiceInstall", decompile_service_install_table);
}

const SERVICE_INTERACTIVE: i64 = 0x100;
const ERROR_CONTROL_VITAL: i64 = 0x8000;

fn service_type(value: i64) -> Option<&'static str> {
    match value {
        0x1 => Some("kernelDriver"),
        0x2 => Some("systemDriver"),
        0x10 => Some("ownProcess"),
        0x20 => Some("shareProcess"),
        _ => None,
    }
}

fn start_type(value: i64) -> Option<&'static str> {
    match value {
        0 => Some("boot"),
        1 => Some("system"),
        2 => Some("auto"),
        3 => Some("demand"),
        4 => Some("disabled"),
        _ => None,
    }
}

fn error_control(value: i64) -> Option<&'static str> {
    match value {
        0 => Some("ignore"),
        1 => Some("normal"),
        3 => Some("critical"),
        _ => None,
    }
}

fn decompile_service_install_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let service = ctx.doc.create("ServiceInstall");
        copy(ctx, service, &row, "ServiceInstall", "Id");
        copy(ctx, service, &row, "Name", "Name");
        copy(ctx, service, &row, "DisplayName", "DisplayName");

        let kind = row.int("ServiceType").unwrap_or(0);
        match service_type(kind & !SERVICE_INTERACTIVE) {
            Some(name) => ctx.doc.set_attribute(service, "Type", name),
            None => ctx.illegal_value(&row, "ServiceType", kind),
        }
        if kind & SERVICE_INTERACTIVE != 0 {
            set_yes(ctx, service, "Interactive");
        }

        let start = row.int("StartType").unwrap_or(-1);
        match start_type(start) {
            Some(name) => ctx.doc.set_attribute(service, "Start", name),
            None => ctx.illegal_value(&row, "StartType", start),
        }

        let errors = row.int("ErrorControl").unwrap_or(-1);
        match error_control(errors & !ERROR_CONTROL_VITAL) {
            Some(name) => ctx.doc.set_attribute(service, "ErrorControl", name),
            None => ctx.illegal_value(&row, "ErrorControl", errors),
        }
        if errors >= 0 && errors & ERROR_CONTROL_VITAL != 0 {
            set_yes(ctx, service, "Vital");
        }

        copy(ctx, service, &row, "LoadOrderGroup", "LoadOrderGroup");
        copy(ctx, service, &row, "StartName", "Account");
        copy(ctx, service, &row, "Password", "Password");
        copy(ctx, service, &row, "Arguments", "Arguments");
        copy(ctx, service, &row, "Description", "Description");

        if let Some(dependencies) = row.str("Dependencies") {
            for dependency in split_multi_string(dependencies) {
                if dependency.is_empty() {
                    continue;
                }
                let element = ctx.doc.create_child(service, "ServiceDependency");
                match dependency.strip_prefix('+') {
                    Some(group) => {
                        ctx.doc.set_attribute(element, "Id", group);
                        set_yes(ctx, element, "Group");
                    }
                    None => ctx.doc.set_attribute(element, "Id", dependency.as_str()),
                }
            }
        }

        ctx.add_to_component(&row, service);
        ctx.index.insert_row(&row, service);
    }
}

fn decompile_service_control_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let control = ctx.doc.create("ServiceControl");
        copy(ctx, control, &row, "ServiceControl", "Id");
        copy(ctx, control, &row, "Name", "Name");

        let bits = row.int("Event").unwrap_or(0);
        let events = ServiceEvents::from_bits_truncate(bits as u32);
        let pairs = [
            ("Start", ServiceEvents::INSTALL_START, ServiceEvents::UNINSTALL_START),
            ("Stop", ServiceEvents::INSTALL_STOP, ServiceEvents::UNINSTALL_STOP),
            ("Remove", ServiceEvents::INSTALL_DELETE, ServiceEvents::UNINSTALL_DELETE),
        ];
        for (attribute, install, uninstall) in pairs {
            let value = match (events.contains(install), events.contains(uninstall)) {
                (true, true) => "both",
                (true, false) => "install",
                (false, true) => "uninstall",
                (false, false) => continue,
            };
            ctx.doc.set_attribute(control, attribute, value);
        }
        ctx.unknown_bits(&row, "Event", unknown_bits(bits, ServiceEvents::all().bits()));

        match row.int("Wait") {
            Some(0) => ctx.doc.set_attribute(control, "Wait", "no"),
            Some(1) => set_yes(ctx, control, "Wait"),
            None => {}
            Some(other) => ctx.illegal_value(&row, "Wait", other),
        }

        if let Some(arguments) = row.str("Arguments") {
            for argument in split_multi_string(arguments) {
                let element = ctx.doc.create_child(control, "ServiceArgument");
                ctx.doc.set_text(element, argument);
            }
        }

        ctx.add_to_component(&row, control);
        ctx.index.insert_row(&row, control);
    }
}

fn decompile_odbc_driver_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_odbc_library(ctx, table, "ODBCDriver", "Driver");
}

fn decompile_odbc_translator_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_odbc_library(ctx, table, "ODBCTranslator", "Translator");
}

fn decompile_odbc_library(ctx: &mut Context<'_>, table: &Table, element_name: &str, key: &str) {
    for row in table.views() {
        let element = ctx.doc.create(element_name);
        copy(ctx, element, &row, key, "Id");
        copy(ctx, element, &row, "Description", "Name");
        copy(ctx, element, &row, "File_", "File");
        copy(ctx, element, &row, "File_Setup", "SetupFile");
        ctx.add_to_component(&row, element);
        ctx.index.insert_row(&row, element);
    }
}

fn decompile_odbc_data_source_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let source = ctx.doc.create("ODBCDataSource");
        copy(ctx, source, &row, "DataSource", "Id");
        copy(ctx, source, &row, "Description", "Name");
        copy(ctx, source, &row, "DriverDescription", "DriverName");

        match row.int("Registration") {
            Some(0) => ctx.doc.set_attribute(source, "Registration", "machine"),
            Some(1) => ctx.doc.set_attribute(source, "Registration", "user"),
            other => ctx.illegal_value(&row, "Registration", other.unwrap_or_default()),
        }

        ctx.add_to_component(&row, source);
        ctx.index.insert_row(&row, source);
    }
}

fn decompile_odbc_attribute_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_odbc_properties(ctx, table, "Driver_", "ODBCDriver");
}

fn decompile_odbc_source_attribute_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_odbc_properties(ctx, table, "DataSource_", "ODBCDataSource");
}

fn decompile_odbc_properties(ctx: &mut Context<'_>, table: &Table, column: &str, owner: &str) {
    for row in table.views() {
        let Some(parent) = ctx.require(&row, column, owner) else {
            continue;
        };
        let property = ctx.doc.create_child(parent, "Property");
        copy(ctx, property, &row, "Attribute", "Id");
        copy(ctx, property, &row, "Value", "Value");
    }
}

fn decompile_publish_component_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let category = ctx.doc.create("Category");
        copy(ctx, category, &row, "ComponentId", "Id");
        copy(ctx, category, &row, "Qualifier", "Qualifier");
        copy(ctx, category, &row, "AppData", "AppData");
        copy(ctx, category, &row, "Feature_", "Feature");
        ctx.add_to_component(&row, category);
        ctx.index.insert_row(&row, category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database};

    fn context<'a>(db: &'a Database, options: &'a DecompileOptions) -> Context<'a> {
        let mut ctx = Context::new(db, options);
        let component = ctx.add_to_package("Component");
        ctx.index.insert("Component", "Svc", component);
        ctx
    }

    #[test]
    fn test_service_install() {
        let mut table = Table::new(standard_definition("ServiceInstall").unwrap());
        table.add_row(vec![
            "svc".into(),
            "DemoSvc".into(),
            "Demo Service".into(),
            (0x10 | 0x100).into(),
            2.into(),
            (1 | 0x8000).into(),
            CellValue::Null,
            "RpcSs[~]+NetGroup[~][~]".into(),
            CellValue::Null,
            CellValue::Null,
            CellValue::Null,
            "Svc".into(),
            CellValue::Null,
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = context(&db, &options);
        decompile_service_install_table(&mut ctx, &table);

        let service = ctx.index.get("ServiceInstall", "svc").unwrap();
        assert_eq!(ctx.doc.attribute(service, "Type"), Some("ownProcess"));
        assert_eq!(ctx.doc.attribute(service, "Interactive"), Some("yes"));
        assert_eq!(ctx.doc.attribute(service, "Start"), Some("auto"));
        assert_eq!(ctx.doc.attribute(service, "ErrorControl"), Some("normal"));
        assert_eq!(ctx.doc.attribute(service, "Vital"), Some("yes"));

        let deps = ctx.doc.children(service).to_vec();
        assert_eq!(deps.len(), 2);
        assert_eq!(ctx.doc.attribute(deps[0], "Id"), Some("RpcSs"));
        assert_eq!(ctx.doc.attribute(deps[1], "Id"), Some("NetGroup"));
        assert_eq!(ctx.doc.attribute(deps[1], "Group"), Some("yes"));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_service_control_events() {
        let mut table = Table::new(standard_definition("ServiceControl").unwrap());
        table.add_row(vec![
            "ctl".into(),
            "DemoSvc".into(),
            (0x01 | 0x02 | 0x20 | 0x80).into(),
            "-a[~]-b".into(),
            1.into(),
            "Svc".into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = context(&db, &options);
        decompile_service_control_table(&mut ctx, &table);

        let control = ctx.index.get("ServiceControl", "ctl").unwrap();
        assert_eq!(ctx.doc.attribute(control, "Start"), Some("install"));
        assert_eq!(ctx.doc.attribute(control, "Stop"), Some("both"));
        assert_eq!(ctx.doc.attribute(control, "Remove"), Some("uninstall"));
        assert_eq!(ctx.doc.attribute(control, "Wait"), Some("yes"));
        let args: Vec<_> = ctx
            .doc
            .children(control)
            .iter()
            .filter_map(|a| ctx.doc.text(*a))
            .collect();
        assert_eq!(args, vec!["-a", "-b"]);
    }
}

use mongodb::bson::Bson;

/// Runtime type name shown next to scalar fields in the schema tree.
pub fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Document(_) => "Object",
        Bson::Array(_) => "Array",
        Bson::String(_) => "String",
        Bson::Boolean(_) => "Boolean",
        Bson::Int32(_) => "Int32",
        Bson::Int64(_) => "Int64",
        Bson::Double(_) => "Double",
        Bson::Decimal128(_) => "Decimal128",
        Bson::DateTime(_) => "DateTime",
        Bson::ObjectId(_) => "ObjectId",
        Bson::Binary(_) => "Binary",
        Bson::Symbol(_) => "Symbol",
        Bson::RegularExpression(_) => "Regex",
        Bson::Timestamp(_) => "Timestamp",
        Bson::JavaScriptCode(_) => "JavaScriptCode",
        Bson::JavaScriptCodeWithScope(_) => "JavaScriptCodeWithScope",
        Bson::DbPointer(_) => "DbPointer",
        Bson::Undefined => "Undefined",
        Bson::Null => "Null",
        Bson::MinKey => "MinKey",
        Bson::MaxKey => "MaxKey",
    }
}

/// Plain text for a table cell. Null and undefined render empty.
pub fn cell_text(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::Boolean(b) => b.to_string(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => format!("{f}"),
        Bson::Decimal128(d) => d.to_string(),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(iso) => iso,
            Err(_) => dt.timestamp_millis().to_string(),
        },
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Symbol(sym) => sym.clone(),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::Timestamp(ts) => format!("Timestamp(time={}, increment={})", ts.time, ts.increment),
        Bson::Binary(bin) => format!("Binary(len={}, subtype={:?})", bin.bytes.len(), bin.subtype),
        other => other.to_string(),
    }
}

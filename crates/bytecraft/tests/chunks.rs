//! A chunked container layout: a fixed signature followed by length-prefixed,
//! tagged chunks whose payload layout depends on the tag.

use std::sync::Arc;

use bytecraft::{
    config::SchemaConfig,
    errors::{ReadError, ResolveError, WriteError},
    field::{Field, FieldKind},
    producer::{Selector, constant, count_of, counted_by, size_of},
    record::Record,
    schema::Schema,
    types::{ByteOrder, Scalar},
    value::Value,
};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

struct Layout {
    signature: Arc<Schema>,
    header: Arc<Schema>,
    file: Arc<Schema>,
    chunk: Arc<Schema>,
}

fn big_endian() -> SchemaConfig {
    let mut config = SchemaConfig::new();
    config.set_byte_order(ByteOrder::Big);
    config
}

fn layout() -> Layout {
    let signature = Arc::new(
        Schema::compile_with(&[Field::array("signature", Scalar::U8, 8)], big_endian()).unwrap(),
    );

    let header = Arc::new(
        Schema::compile_with(
            &[
                Field::scalar("width", Scalar::U32),
                Field::scalar("height", Scalar::U32),
                Field::scalar("bit_depth", Scalar::U8),
                Field::scalar("color_type", Scalar::U8),
                Field::scalar("compression_method", Scalar::U8).with_default(constant(0u8)),
                Field::scalar("filter_method", Scalar::U8).with_default(constant(0u8)),
                Field::scalar("interlace_method", Scalar::U8).with_default(constant(0u8)),
            ],
            big_endian(),
        )
        .unwrap(),
    );

    let file = Arc::new(
        Schema::compile_with(
            &[
                Field::scalar("name_len", Scalar::U32).with_default(count_of("name")),
                Field::sequence("name", Scalar::U8).with_count(counted_by("name_len")),
                Field::scalar("data_len", Scalar::U32).with_default(count_of("data")),
                Field::sequence("data", Scalar::U8).with_count(counted_by("data_len")),
            ],
            big_endian(),
        )
        .unwrap(),
    );

    let (ihdr, dead) = (Arc::clone(&header), Arc::clone(&file));
    let payload = Selector::new(move |r| {
        let tag = r.get("type")?.to_bytes().unwrap_or_default();
        Ok(match tag.as_slice() {
            b"IHDR" => FieldKind::Record(Arc::clone(&ihdr)),
            b"deAd" => FieldKind::Record(Arc::clone(&dead)),
            _ => FieldKind::Sequence(Scalar::U8),
        })
    });

    let chunk = Arc::new(
        Schema::compile_with(
            &[
                Field::scalar("length", Scalar::U32).with_default(size_of("data")),
                Field::array("type", Scalar::U8, 4),
                Field::select("data", payload).with_count(counted_by("length")),
                Field::scalar("crc", Scalar::U32).with_default(constant(0u32)),
            ],
            big_endian(),
        )
        .unwrap(),
    );

    Layout {
        signature,
        header,
        file,
        chunk,
    }
}

fn chunk(layout: &Layout, tag: &[u8; 4], data: impl Into<Value>) -> Record {
    layout
        .chunk
        .record()
        .with("type", tag)
        .unwrap()
        .with("data", data)
        .unwrap()
}

#[test]
fn test_file_chunk_layout() {
    let layout = layout();
    let file = layout
        .file
        .record()
        .with("name", b"a.txt")
        .unwrap()
        .with("data", b"hi")
        .unwrap();

    let bytes = chunk(&layout, b"deAd", file).pack().unwrap();

    let mut expected = vec![0, 0, 0, 15];
    expected.extend_from_slice(b"deAd");
    expected.extend_from_slice(&[0, 0, 0, 5]);
    expected.extend_from_slice(b"a.txt");
    expected.extend_from_slice(&[0, 0, 0, 2]);
    expected.extend_from_slice(b"hi");
    expected.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(bytes, expected);
}

#[test]
fn test_walk_chunk_stream() {
    let layout = layout();

    let mut stream = layout
        .signature
        .record()
        .with("signature", SIGNATURE)
        .unwrap()
        .pack()
        .unwrap();

    let header = layout
        .header
        .record()
        .with("width", 640u32)
        .unwrap()
        .with("height", 480u32)
        .unwrap()
        .with("bit_depth", 8u8)
        .unwrap()
        .with("color_type", 2u8)
        .unwrap();
    let file = layout
        .file
        .record()
        .with("name", b"notes")
        .unwrap()
        .with("data", vec![0xdeu8, 0xad, 0xbe, 0xef])
        .unwrap();

    let mut chunks = vec![
        chunk(&layout, b"IHDR", header),
        chunk(&layout, b"teXt", b"comment"),
        chunk(&layout, b"deAd", file),
        chunk(&layout, b"IEND", Vec::<Value>::new()),
    ];
    for c in chunks.iter_mut() {
        stream.extend(c.pack().unwrap());
    }
    stream.extend_from_slice(b"trailing");

    let signature = layout.signature.unpack(&stream).unwrap();
    assert_eq!(signature.get("signature"), Some(&Value::from(SIGNATURE)));

    let mut offset = 8;
    let mut decoded = Vec::new();
    loop {
        let (chunk, consumed) = layout.chunk.unpack_from(&stream, offset).unwrap();
        offset += consumed;
        let done = chunk.get("type").and_then(Value::to_bytes) == Some(b"IEND".to_vec());
        decoded.push(chunk);
        if done {
            break;
        }
    }

    assert_eq!(&stream[offset..], b"trailing");
    assert_eq!(decoded, chunks);

    let header = decoded[0].get("data").and_then(Value::as_record).unwrap();
    assert_eq!(header.get("width"), Some(&Value::U64(640)));
    assert_eq!(decoded[1].get("length"), Some(&Value::U64(7)));

    let file = decoded[2].get("data").and_then(Value::as_record).unwrap();
    assert_eq!(file.get("name").and_then(Value::to_bytes), Some(b"notes".to_vec()));
    assert_eq!(file.get("data_len"), Some(&Value::U64(4)));
}

#[test]
fn test_nested_record_can_be_edited() {
    let layout = layout();
    let file = layout.file.record().with("name", b"x").unwrap().with("data", b"").unwrap();
    let mut c = chunk(&layout, b"deAd", file);

    assert_eq!(c.size().unwrap(), 4 + 4 + 9 + 4);

    let inner = c.record_mut("data").unwrap();
    inner.set("data", b"abc").unwrap();
    inner.clear("data_len");
    c.clear("length");

    assert_eq!(c.size().unwrap(), 4 + 4 + 12 + 4);
}

#[test]
fn test_truncated_chunk_payload() {
    let layout = layout();
    let mut bytes = chunk(&layout, b"teXt", b"comment").pack().unwrap();
    bytes.truncate(10);

    assert_eq!(
        layout.chunk.unpack(&bytes).unwrap_err(),
        ReadError::TruncatedInput {
            field: "data".to_string(),
            needed: 7,
            remaining: 2
        }
    );
}

#[test]
fn test_cycle_through_selector() {
    let schema = Arc::new(
        Schema::compile(&[
            Field::scalar("a", Scalar::U8).with_default(size_of("b")),
            Field::select(
                "b",
                Selector::new(|r| {
                    r.get("a")?;
                    Ok(FieldKind::Scalar(Scalar::U8))
                }),
            ),
        ])
        .unwrap(),
    );
    let mut record = schema.record().with("b", 1u8).unwrap();

    assert_eq!(
        record.pack().unwrap_err(),
        WriteError::Resolve(ResolveError::CyclicDependency(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string()
        ]))
    );
}

#[test]
fn test_selector_returning_select_is_rejected() {
    let schema = Arc::new(
        Schema::compile(&[Field::select(
            "data",
            Selector::new(|_| Ok(FieldKind::Select(Selector::new(|_| Ok(FieldKind::Scalar(Scalar::U8)))))),
        )])
        .unwrap(),
    );

    assert_eq!(
        schema.unpack(&[1]).unwrap_err(),
        ReadError::Resolve(ResolveError::InvalidSelection("data".to_string()))
    );
}

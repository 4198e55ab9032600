//! Integration tests for writing frame files and verifying them with the reader.

use ndnetcdf::file::{FileOpenMode, FrameFileWriter, NetCdfFileWriter, WriterConfig};
use ndnetcdf::ndarray::{ArrayFrame, AttrValue, Attribute};
use ndnetcdf::netcdf::{NcFormat, NcReader, NcType, NcValues};
use ndnetcdf::util::{AttrDataType, DataType, Dimension, Dimensions, Element};
use ndnetcdf::Error;

use tempfile::NamedTempFile;

const MULTI: FileOpenMode = FileOpenMode::WRITE.union(FileOpenMode::MULTIPLE);

fn roundtrip<T: Element>(values: [T; 6], storage: NcType, to_be: fn(T) -> Vec<u8>) {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let frame = ArrayFrame::from_elements([3usize, 2], &values).expect("Failed to build frame");
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &frame).expect("Failed to open");
    writer.write(&frame).expect("Failed to write frame 0");
    writer.write(&frame).expect("Failed to write frame 1");
    writer.close().expect("Failed to close");

    let reader = NcReader::open(path).expect("Failed to open reader");
    assert_eq!(reader.var_shape("array_data").unwrap(), vec![2, 2, 3]);
    assert_eq!(reader.var("array_data").unwrap().nc_type, storage);
    assert_eq!(
        reader.global_attr("dataType"),
        Some(&NcValues::Int(vec![T::DATA_TYPE.code()])),
        "dataType for {}",
        T::DATA_TYPE
    );

    let expected: Vec<u8> = values.iter().flat_map(|&v| to_be(v)).collect();
    for record in 0..2 {
        assert_eq!(reader.read_slab_bytes("array_data", record).unwrap(), expected.as_slice());
    }
}

#[test]
fn test_roundtrip_all_element_types() {
    roundtrip([1i8, -2, 3, -4, 5, -128], NcType::Byte, |v| v.to_be_bytes().to_vec());
    roundtrip([0u8, 1, 127, 128, 200, 255], NcType::Byte, |v| v.to_be_bytes().to_vec());
    roundtrip([1i16, -2, 300, -400, i16::MAX, i16::MIN], NcType::Short, |v| v.to_be_bytes().to_vec());
    roundtrip([0u16, 1, 40000, 65535, 256, 7], NcType::Short, |v| v.to_be_bytes().to_vec());
    roundtrip([1i32, -2, 70000, i32::MIN, i32::MAX, 0], NcType::Int, |v| v.to_be_bytes().to_vec());
    roundtrip([0u32, 1, u32::MAX, 1 << 31, 12345678, 9], NcType::Int, |v| v.to_be_bytes().to_vec());
    roundtrip([0.0f32, -1.5, 3.25, f32::MAX, 1e-20, 42.0], NcType::Float, |v| v.to_be_bytes().to_vec());
    roundtrip([0.0f64, -1.5, 3.25, f64::MIN, 1e-300, 42.0], NcType::Double, |v| v.to_be_bytes().to_vec());
}

#[test]
fn test_unsigned_values_keep_their_bits() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let frame = ArrayFrame::from_elements([2usize], &[40000u16, 1]).unwrap();
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, FileOpenMode::WRITE, &frame).unwrap();
    writer.write(&frame).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    let stored = reader.read_i16("array_data").unwrap();
    let restored: Vec<u16> = stored.iter().map(|&v| v as u16).collect();
    assert_eq!(restored, vec![40000, 1]);
    assert_eq!(reader.global_attr("dataType"), Some(&NcValues::Int(vec![DataType::UInt16.code()])));
}

#[test]
fn test_dimension_reversal() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let data: Vec<u8> = (0..24).collect();
    let frame = ArrayFrame::from_elements([2usize, 3, 4], &data).unwrap();
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, FileOpenMode::WRITE, &frame).unwrap();
    writer.write(&frame).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.dim_len("dim0"), Some(4));
    assert_eq!(reader.dim_len("dim1"), Some(3));
    assert_eq!(reader.dim_len("dim2"), Some(2));
    assert_eq!(
        reader.var_dim_names("array_data").unwrap(),
        vec!["numArrays", "dim0", "dim1", "dim2"]
    );
    assert_eq!(reader.var_shape("array_data").unwrap(), vec![1, 4, 3, 2]);
    assert_eq!(reader.global_attr("numArrayDims"), Some(&NcValues::Int(vec![3])));
    assert_eq!(reader.global_attr("dimSize"), Some(&NcValues::Int(vec![2, 3, 4])));

    // Frame buffer order is preserved: dimension 0 is the fastest container axis.
    assert_eq!(reader.read_var_bytes("array_data").unwrap(), data);
}

#[test]
fn test_global_attributes() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let dims = Dimensions::from(vec![
        Dimension::new(8).with_offset(100).with_binning(2),
        Dimension::new(4).with_offset(50).with_reverse(true),
    ]);
    let frame = ArrayFrame::zeroed(DataType::Float32, dims)
        .unwrap()
        .with_attribute(Attribute::new("Gain", "detector gain", 2.0f32))
        .with_attribute(Attribute::new("Model", "camera model", "X100"));

    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &frame).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    let names: Vec<&str> = reader.header().attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "dataType",
            "NDNetCDFFileVersion",
            "numArrayDims",
            "dimSize",
            "dimOffset",
            "dimBinning",
            "dimReverse",
            "Gain_DataType",
            "Gain_Description",
            "Model_DataType",
            "Model_Description",
        ]
    );

    assert_eq!(reader.global_attr("NDNetCDFFileVersion"), Some(&NcValues::Double(vec![3.0])));
    assert_eq!(reader.global_attr("dimSize"), Some(&NcValues::Int(vec![8, 4])));
    assert_eq!(reader.global_attr("dimOffset"), Some(&NcValues::Int(vec![100, 50])));
    assert_eq!(reader.global_attr("dimBinning"), Some(&NcValues::Int(vec![2, 1])));
    assert_eq!(reader.global_attr("dimReverse"), Some(&NcValues::Int(vec![0, 1])));
    assert_eq!(
        reader.global_attr("Gain_DataType"),
        Some(&NcValues::Int(vec![AttrDataType::Float32.code()]))
    );
    assert_eq!(
        reader.global_attr("Model_DataType"),
        Some(&NcValues::Int(vec![AttrDataType::String.code()]))
    );
    assert_eq!(
        reader.global_attr("Model_Description").and_then(NcValues::as_text).as_deref(),
        Some("camera model")
    );

    assert!(reader.dim("numArrays").unwrap().is_unlimited());
    assert_eq!(reader.dim_len("attrStringSize"), Some(256));
    assert_eq!(reader.var("Gain").unwrap().nc_type, NcType::Float);
    assert_eq!(reader.var_dim_names("Model").unwrap(), vec!["numArrays", "attrStringSize"]);
    assert_eq!(reader.record_count(), 0);
}

#[test]
fn test_attribute_slot_order_stable() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let make = |i: i32| {
        ArrayFrame::zeroed(DataType::UInt8, [4usize])
            .unwrap()
            .with_unique_id(i)
            .with_attribute(Attribute::new("Alpha", "", i * 10))
            .with_attribute(Attribute::new("Beta", "", format!("frame-{}", i)))
            .with_attribute(Attribute::new("Gamma", "", i as f64 / 4.0))
    };

    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &make(0)).unwrap();
    for i in 0..3 {
        writer.write(&make(i)).unwrap();
    }
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    let vars: Vec<&str> = reader.vars().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(vars, vec!["uniqueId", "timeStamp", "array_data", "Alpha", "Beta", "Gamma"]);

    assert_eq!(reader.read_i32("Alpha").unwrap(), vec![0, 10, 20]);
    assert_eq!(reader.read_f64("Gamma").unwrap(), vec![0.0, 0.25, 0.5]);
    for i in 0..3 {
        assert_eq!(reader.read_text("Beta", i).unwrap(), format!("frame-{}", i));
    }
}

#[test]
fn test_single_record_mode() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let frame = ArrayFrame::zeroed(DataType::Int16, [3usize, 3]).unwrap().with_unique_id(42);
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, FileOpenMode::WRITE, &frame).unwrap();
    assert_eq!(writer.schema().and_then(|s| s.capacity()), Some(1));
    writer.write(&frame).unwrap();

    let err = writer.write(&frame.clone().with_unique_id(43)).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { axis: 0, start: 1, len: 1 }), "got {:?}", err);
    assert_eq!(writer.next_record(), Some(1));
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert!(!reader.dim("numArrays").unwrap().is_unlimited());
    assert_eq!(reader.read_i32("uniqueId").unwrap(), vec![42]);
}

#[test]
fn test_multiple_record_mode() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let make = |i: i32| {
        ArrayFrame::from_elements([2usize], &[i as f32, -(i as f32)])
            .unwrap()
            .with_unique_id(i)
            .with_time_stamp(f64::from(i) * 0.5)
    };

    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &make(1)).unwrap();
    for i in 1..=5 {
        writer.write(&make(i)).unwrap();
        assert_eq!(writer.next_record(), Some(i as usize));
    }
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.record_count(), 5);
    assert_eq!(reader.read_i32("uniqueId").unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(reader.read_f64("timeStamp").unwrap(), vec![0.5, 1.0, 1.5, 2.0, 2.5]);
    assert_eq!(
        reader.read_f32("array_data").unwrap(),
        vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0, -4.0, 5.0, -5.0]
    );
}

#[test]
fn test_string_attribute_actual_length() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let make = |s: &str| ArrayFrame::zeroed(DataType::UInt8, [2usize]).unwrap().with_attribute(Attribute::new("Note", "", s));

    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &make("")).unwrap();
    writer.write(&make("a much longer string")).unwrap();
    writer.write(&make("mid")).unwrap();
    writer.write(&make("")).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.read_text("Note", 0).unwrap(), "a much longer string");
    assert_eq!(reader.read_text("Note", 1).unwrap(), "mid");
    assert_eq!(reader.read_text("Note", 2).unwrap(), "");

    let row = reader.read_slab_bytes("Note", 1).unwrap();
    assert_eq!(row.len(), 256);
    assert_eq!(&row[..3], b"mid");
    assert!(row[3..].iter().all(|&b| b == 0));
}

#[test]
fn test_string_cap() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let config = WriterConfig::new().with_string_size(8);
    let make = |s: &str| ArrayFrame::zeroed(DataType::UInt8, [2usize]).unwrap().with_attribute(Attribute::new("Note", "", s));

    let mut writer = NetCdfFileWriter::with_config(config).unwrap();
    let err = writer.open(path, MULTI, &make("12345678")).unwrap_err();
    assert!(matches!(err, Error::AttributeTooLong { len: 8, max: 7, .. }));
    assert!(!writer.is_open());

    writer.open(path, MULTI, &make("1234567")).unwrap();
    writer.write(&make("abcdefghij")).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.dim_len("attrStringSize"), Some(8));
    assert_eq!(reader.read_text("Note", 0).unwrap(), "abcdefg");
}

#[test]
fn test_read_and_append_rejected_without_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("rejected.nc");
    let frame = ArrayFrame::zeroed(DataType::Int8, [2usize]).unwrap();
    let mut writer = NetCdfFileWriter::new();

    for mode in [
        FileOpenMode::READ,
        FileOpenMode::APPEND,
        FileOpenMode::READ | FileOpenMode::WRITE,
        FileOpenMode::APPEND | FileOpenMode::MULTIPLE,
    ] {
        let err = writer.open(&path, mode, &frame).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)), "mode {}: {:?}", mode, err);
        assert!(!path.exists(), "mode {} created a file", mode);
        assert!(!writer.is_open());
    }
}

#[test]
fn test_undefined_attribute() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("undefined.nc");

    let undefined = ArrayFrame::zeroed(DataType::Int8, [2usize])
        .unwrap()
        .with_attribute(Attribute::new("Pending", "", AttrValue::Undefined));
    let mut writer = NetCdfFileWriter::new();
    let err = writer.open(&path, MULTI, &undefined).unwrap_err();
    assert!(matches!(err, Error::UndefinedAttributeType(_)));
    assert!(!path.exists());

    let good = ArrayFrame::zeroed(DataType::Int8, [2usize])
        .unwrap()
        .with_attribute(Attribute::new("Pending", "", 1i32));
    writer.open(&path, MULTI, &good).unwrap();
    let err = writer.write(&undefined).unwrap_err();
    assert!(matches!(err, Error::UndefinedAttributeType(_)));
    assert_eq!(writer.next_record(), Some(0));

    writer.write(&good).unwrap();
    writer.close().unwrap();
    assert_eq!(NcReader::open(&path).unwrap().record_count(), 1);
}

#[test]
fn test_schema_mismatch_fails_fast() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let frame = ArrayFrame::zeroed(DataType::UInt16, [4usize, 4]).unwrap();
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, MULTI, &frame).unwrap();

    let wrong_shape = ArrayFrame::zeroed(DataType::UInt16, [4usize, 3]).unwrap();
    assert!(matches!(writer.write(&wrong_shape), Err(Error::SchemaMismatch { .. })));

    let wrong_type = ArrayFrame::zeroed(DataType::Int32, [4usize, 4]).unwrap();
    assert!(matches!(writer.write(&wrong_type), Err(Error::SchemaMismatch { .. })));

    let extra_attr = frame.clone().with_attribute(Attribute::new("Extra", "", 1u8));
    assert!(matches!(writer.write(&extra_attr), Err(Error::SchemaMismatch { .. })));

    assert_eq!(writer.next_record(), Some(0));
    writer.close().unwrap();
    assert_eq!(NcReader::open(path).unwrap().record_count(), 0);
}

#[test]
fn test_offset64_config() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let config = WriterConfig::new().with_format(NcFormat::Offset64);
    let frame = ArrayFrame::from_elements([3usize], &[1.0f64, 2.0, 3.0]).unwrap();
    let mut writer = NetCdfFileWriter::with_config(config).unwrap();
    writer.open(path, MULTI, &frame).unwrap();
    writer.write(&frame).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.format(), NcFormat::Offset64);
    assert_eq!(reader.read_f64("array_data").unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_drop_without_close_finalizes() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    {
        let frame = ArrayFrame::zeroed(DataType::Int32, [2usize]).unwrap();
        let mut writer = NetCdfFileWriter::new();
        writer.open(path, MULTI, &frame).unwrap();
        writer.write(&frame).unwrap();
        writer.write(&frame).unwrap();
    }

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.record_count(), 2);
}

#[test]
fn test_existing_file_is_replaced() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();
    std::fs::write(path, vec![0xAB; 10_000]).unwrap();

    let frame = ArrayFrame::zeroed(DataType::UInt8, [2usize]).unwrap();
    let mut writer = NetCdfFileWriter::new();
    writer.open(path, FileOpenMode::WRITE, &frame).unwrap();
    writer.write(&frame).unwrap();
    writer.close().unwrap();

    let reader = NcReader::open(path).unwrap();
    assert_eq!(reader.read_var_bytes("array_data").unwrap(), vec![0, 0]);
    assert!(std::fs::metadata(path).unwrap().len() < 10_000);
}

use lattice_reader::{Dtype, ElementMetaData, Endianness, ErrorKind, LatticeError, ScalarKind};

#[test]
fn dtype_without_byte_order_marker() {
    let dtype = Dtype::parse("f4").expect("f4");
    assert_eq!(dtype.width(), 4);
    assert_eq!(dtype.kind, ScalarKind::Float);
    assert_eq!(dtype.endianness, Endianness::Native);
}

#[test]
fn dtype_markers_and_kinds() {
    let cases = [
        (">c16", Endianness::Big, ScalarKind::Complex, 16),
        ("<i2", Endianness::Little, ScalarKind::Int, 2),
        ("=u8", Endianness::Native, ScalarKind::UInt, 8),
        (">f8", Endianness::Big, ScalarKind::Float, 8),
        ("c8", Endianness::Native, ScalarKind::Complex, 8),
    ];
    for (code, endianness, kind, width) in cases {
        let dtype: Dtype = code.parse().unwrap_or_else(|e| panic!("{}: {}", code, e));
        assert_eq!(dtype.endianness, endianness, "{}", code);
        assert_eq!(dtype.kind, kind, "{}", code);
        assert_eq!(dtype.width(), width, "{}", code);
    }
    assert_eq!(Dtype::parse(">c16").unwrap().to_string(), ">c16");
}

#[test]
fn malformed_dtype_is_a_decoding_error() {
    for code in ["bogus", "", ">", "x4", "f", "<>f4", "f4 ", "i0", "f2", "c4", "u3"] {
        let err = Dtype::parse(code).expect_err(code);
        assert!(matches!(err, LatticeError::InvalidDtype(ref c) if c == code), "{}: {:?}", code, err);
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }
}

#[test]
fn metadata_validates_eagerly() {
    let element = ElementMetaData::new(vec![4096, 4, 3, 3], ">c16", 0).expect("valid metadata");
    assert_eq!(element.shape(), &[4096, 4, 3, 3]);
    assert_eq!(element.dtype().width(), 16);
    assert_eq!(element.offset(), 0);

    let err = ElementMetaData::new(vec![2, 2], "bogus", 0).expect_err("bad dtype");
    assert_eq!(err.kind(), ErrorKind::Decoding);

    let err = ElementMetaData::new(Vec::new(), "f8", 0).expect_err("empty shape");
    assert!(matches!(err, LatticeError::InvalidShape(_)));

    let err = ElementMetaData::new(vec![3, 0], "f8", 0).expect_err("zero extent");
    assert_eq!(err.kind(), ErrorKind::Decoding);

    let err = ElementMetaData::new(vec![usize::MAX, 2], "f8", 0).expect_err("unaddressable shape");
    assert!(matches!(err, LatticeError::InvalidShape(_)), "{:?}", err);
}

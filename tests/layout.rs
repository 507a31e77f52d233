use lattice_reader::{ErrorKind, LatticeError, StridedLayout};

const SHAPES: &[&[usize]] = &[&[7], &[3, 5], &[2, 3, 4], &[128, 4096, 4, 3, 3], &[1, 1, 9]];

#[test]
fn strides_follow_row_major_recurrence() {
    for shape in SHAPES {
        let layout = StridedLayout::new(shape, 16).expect("layout");
        let stride = layout.stride();
        let n = shape.len();
        assert_eq!(stride.len(), n, "stride length for {:?}", shape);
        assert_eq!(stride[n - 1], 1, "last stride for {:?}", shape);
        for i in 0..n - 1 {
            assert_eq!(stride[i], shape[i + 1] * stride[i + 1], "stride[{}] for {:?}", i, shape);
        }
    }
}

#[test]
fn element_count_is_stride_of_last_fixed_axis() {
    for shape in SHAPES {
        let layout = StridedLayout::new(shape, 8).expect("layout");
        for k in 1..=shape.len() {
            let index = vec![0; k];
            assert_eq!(
                layout.element_count(&index).expect("count"),
                layout.stride()[k - 1],
                "count for k={} in {:?}",
                k,
                shape
            );
            assert_eq!(layout.sub_shape(&index).expect("sub shape"), &shape[k..]);
        }
    }
}

#[test]
fn byte_offset_scales_by_element_width() {
    let layout = StridedLayout::new(&[2, 3, 4], 4).expect("layout");
    assert_eq!(layout.byte_offset(&[0]).unwrap(), 0);
    assert_eq!(layout.byte_offset(&[1]).unwrap(), 12 * 4);
    assert_eq!(layout.byte_offset(&[1, 2]).unwrap(), (12 + 2 * 4) * 4);
    assert_eq!(layout.byte_offset(&[1, 2, 3]).unwrap(), (12 + 8 + 3) * 4);
    assert_eq!(layout.byte_count(&[1, 2]).unwrap(), 4 * 4);
    assert_eq!(layout.total_bytes(), 24 * 4);
}

#[test]
fn gauge_timeslice_offsets() {
    let layout = StridedLayout::new(&[128, 4096, 4, 3, 3], 16).expect("layout");
    let slice_elements = 4096 * 4 * 3 * 3;
    assert_eq!(layout.element_count(&[5]).unwrap(), slice_elements);
    assert_eq!(layout.byte_offset(&[5]).unwrap(), (5 * slice_elements * 16) as u64);
}

#[test]
fn index_rank_must_fit_layout() {
    let layout = StridedLayout::new(&[2, 3], 8).expect("layout");
    for bad in [&[][..], &[0, 0, 0][..]] {
        let err = layout.element_count(bad).expect_err("rank error");
        assert!(
            matches!(err, LatticeError::InvalidIndex { len, ndim: 2 } if len == bad.len()),
            "unexpected error {:?}",
            err
        );
        assert_eq!(err.kind(), ErrorKind::Index);
    }
}

#[test]
fn bounds_check_reports_offending_axis() {
    let layout = StridedLayout::new(&[2, 3, 4], 8).expect("layout");
    assert!(layout.check_bounds(&[1, 2, 3]).is_ok());
    match layout.check_bounds(&[1, 3]) {
        Err(LatticeError::IndexOutOfBounds { axis, index, len }) => {
            assert_eq!((axis, index, len), (1, 3, 3));
        }
        other => panic!("expected out-of-bounds error, got {:?}", other),
    }
}

#[test]
fn unaddressable_shapes_are_rejected() {
    let cases: [(&[usize], usize); 3] = [
        (&[usize::MAX, 2], 1),
        (&[usize::MAX / 2 + 1], 2),
        (&[1 << 20, 1 << 20, 1 << 20, 1 << 20], 16),
    ];
    for (shape, width) in cases {
        let err = StridedLayout::new(shape, width).expect_err("too large");
        assert!(matches!(err, LatticeError::InvalidShape(_)), "{:?} gave {:?}", shape, err);
    }
}

#[test]
fn byte_offset_overflow_is_an_error() {
    let layout = StridedLayout::new(&[2, 4], 16).expect("layout");
    let err = layout.byte_offset(&[usize::MAX / 2]).expect_err("overflowing offset");
    match err {
        LatticeError::Io(ref e) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput),
        ref other => panic!("expected I/O error, got {:?}", other),
    }
    assert_eq!(layout.byte_offset(&[1, 3]).expect("in range"), (4 + 3) * 16);
}

use dgemm::{
    BlockConfig, DEFAULT_EPSILON, Gemm, GemmError, Isa, MatMut, MatRef, Scratch, SmallPolicy, first_mismatch, gemm,
    gemm_abat, gemm_abt, gemm_naive, gemm_naive_abat, gemm_naive_abt, max_relative_error,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_matrices_equal(expected: &[f64], actual: &[f64], name: &str) {
    assert_eq!(expected.len(), actual.len(), "{}: length mismatch", name);
    if let Some((i, e, a)) = first_mismatch(expected, actual, DEFAULT_EPSILON) {
        panic!(
            "{}: mismatch at index {}: expected {}, got {} (max rel err {:e})",
            name,
            i,
            e,
            a,
            max_relative_error(expected, actual)
        );
    }
}

fn random_matrix(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn check_gemm(m: usize, n: usize, k: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let c0 = random_matrix(&mut rng, m * n);

    let mut c_naive = c0.clone();
    let mut c_fast = c0;
    gemm_naive(m, n, k, &a, k, &b, n, &mut c_naive, n);
    gemm(m, n, k, &a, k, &b, n, &mut c_fast, n).unwrap();

    assert_matrices_equal(&c_naive, &c_fast, &format!("{}x{}x{}", m, n, k));
}

// ============================================================
// Small matrix tests (edge case handling)
// ============================================================

#[test]
fn test_2x3_times_3x2() {
    let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
    let b = vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]; // 3x2
    let mut c = vec![0.0; 4];

    gemm(2, 2, 3, &a, 3, &b, 2, &mut c, 2).unwrap();

    assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn test_7x5x3() {
    let a: Vec<f64> = (0..7 * 3).map(|i| (i % 10) as f64).collect();
    let b: Vec<f64> = (0..3 * 5).map(|i| (i % 10) as f64).collect();

    let mut c_naive = vec![0.0; 7 * 5];
    let mut c_fast = vec![0.0; 7 * 5];

    gemm_naive(7, 5, 3, &a, 3, &b, 5, &mut c_naive, 5);
    gemm(7, 5, 3, &a, 3, &b, 5, &mut c_fast, 5).unwrap();

    assert_matrices_equal(&c_naive, &c_fast, "7x5x3");
}

#[test]
fn test_small_odd_sizes() {
    let test_sizes = [
        (1, 1, 1),
        (3, 3, 3),
        (5, 5, 5),
        (3, 5, 7),
        (7, 3, 5),
        (11, 13, 17),
        (17, 19, 23),
        (31, 33, 29),
        (63, 65, 61),
    ];

    for (seed, (m, n, k)) in test_sizes.into_iter().enumerate() {
        check_gemm(m, n, k, seed as u64);
    }
}

#[test]
fn test_aligned_sizes() {
    for (seed, size) in [4, 8, 16, 32, 64, 128, 256].into_iter().enumerate() {
        check_gemm(size, size, size, 100 + seed as u64);
    }
}

#[test]
fn test_non_square_matrices() {
    let test_sizes = [(100, 50, 75), (50, 100, 75), (129, 257, 130), (300, 12, 260), (4, 600, 9)];

    for (seed, (m, n, k)) in test_sizes.into_iter().enumerate() {
        check_gemm(m, n, k, 200 + seed as u64);
    }
}

#[test]
fn test_large_random_256() {
    check_gemm(256, 256, 256, 42);
}

// ============================================================
// Algebraic properties
// ============================================================

#[test]
fn test_zero_dimensions_leave_c_untouched() {
    let a = vec![1.0; 16];
    let b = vec![1.0; 16];
    let c0: Vec<f64> = (0..16).map(|i| i as f64 * 0.1).collect();

    for (m, n, k) in [(0, 4, 4), (4, 0, 4), (4, 4, 0), (0, 0, 0)] {
        let mut c = c0.clone();
        gemm(m, n, k, &a, k.max(4), &b, n.max(4), &mut c, n.max(4)).unwrap();
        let same = c.iter().zip(&c0).all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(same, "{}x{}x{} modified C", m, n, k);
    }
}

#[test]
fn test_zero_dimensions_abt_and_abat_leave_c_untouched() {
    let a = vec![1.0; 16];
    let b = vec![1.0; 16];
    let c0: Vec<f64> = (0..16).map(|i| i as f64 * 0.1 - 0.7).collect();
    let same = |c: &[f64]| c.iter().zip(&c0).all(|(x, y)| x.to_bits() == y.to_bits());

    for (m, n, k) in [(0, 4, 4), (4, 0, 4), (4, 4, 0), (0, 0, 0)] {
        let mut c = c0.clone();
        gemm_abt(m, n, k, &a, k.max(4), &b, k.max(4), &mut c, n.max(4)).unwrap();
        assert!(same(&c), "abt {}x{}x{} modified C", m, n, k);
    }

    for (m, k) in [(0, 4), (4, 0), (0, 0)] {
        let mut c = c0.clone();
        gemm_abat(m, k, &a, k.max(4), &b, k.max(4), &mut c, m.max(4)).unwrap();
        assert!(same(&c), "abat {}x{} modified C", m, k);
    }
}

#[test]
fn test_accumulation() {
    let (m, n, k) = (37, 45, 29);
    let mut rng = StdRng::seed_from_u64(7);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let c0 = random_matrix(&mut rng, m * n);

    let mut product = vec![0.0; m * n];
    gemm_naive(m, n, k, &a, k, &b, n, &mut product, n);

    let mut c = c0.clone();
    gemm(m, n, k, &a, k, &b, n, &mut c, n).unwrap();
    gemm(m, n, k, &a, k, &b, n, &mut c, n).unwrap();

    let expected: Vec<f64> = c0.iter().zip(&product).map(|(c, p)| c + 2.0 * p).collect();
    assert_matrices_equal(&expected, &c, "accumulate twice");
}

#[test]
fn test_identity_is_exact() {
    let mut identity = vec![0.0; 16];
    for i in 0..4 {
        identity[i * 4 + i] = 1.0;
    }
    let b: Vec<f64> = (0..16).map(|i| i as f64 * 1.25 - 3.0).collect();
    let mut c = vec![0.0; 16];

    gemm(4, 4, 4, &identity, 4, &b, 4, &mut c, 4).unwrap();

    assert_eq!(c, b);
}

// ============================================================
// Path agreement
// ============================================================

#[test]
fn test_small_path_matches_blocked_path() {
    let engine = Gemm::default();
    for (seed, (m, n, k)) in [(5, 7, 3), (16, 16, 16), (20, 31, 9), (32, 30, 32), (48, 64, 40)]
        .into_iter()
        .enumerate()
    {
        let mut rng = StdRng::seed_from_u64(300 + seed as u64);
        let a = random_matrix(&mut rng, m * k);
        let b = random_matrix(&mut rng, k * n);
        let mut c_small = vec![0.0; m * n];
        let mut c_blocked = vec![0.0; m * n];

        let a_view = MatRef::dense(&a, m, k).unwrap();
        let b_view = MatRef::dense(&b, k, n).unwrap();
        engine
            .gemm_small(a_view, b_view, &mut MatMut::dense(&mut c_small, m, n).unwrap(), None)
            .unwrap();
        engine
            .gemm_blocked(a_view, b_view, &mut MatMut::dense(&mut c_blocked, m, n).unwrap(), None)
            .unwrap();

        assert_matrices_equal(&c_blocked, &c_small, &format!("small vs blocked {}x{}x{}", m, n, k));
    }
}

#[test]
fn test_disabled_small_policy_uses_blocked_path() {
    let engine = Gemm::default().with_small_policy(SmallPolicy::disabled()).unwrap();
    let (m, n, k) = (9, 10, 11);
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let mut c = vec![0.0; m * n];
    let mut expected = vec![0.0; m * n];

    gemm_naive(m, n, k, &a, k, &b, n, &mut expected, n);
    engine
        .gemm(
            MatRef::dense(&a, m, k).unwrap(),
            MatRef::dense(&b, k, n).unwrap(),
            &mut MatMut::dense(&mut c, m, n).unwrap(),
            None,
        )
        .unwrap();

    assert_matrices_equal(&expected, &c, "disabled small policy");
}

#[test]
fn test_isa_results_are_bit_identical() {
    let detected = Gemm::default();
    if detected.isa() == Isa::Portable {
        println!("Skipping - AVX2 not available");
        return;
    }
    let portable = Gemm::default().with_isa(Isa::Portable).unwrap();

    let (m, n, k) = (70, 90, 50);
    let mut rng = StdRng::seed_from_u64(99);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let mut c_simd = vec![0.0; m * n];
    let mut c_portable = vec![0.0; m * n];

    let a_view = MatRef::dense(&a, m, k).unwrap();
    let b_view = MatRef::dense(&b, k, n).unwrap();
    detected
        .gemm(a_view, b_view, &mut MatMut::dense(&mut c_simd, m, n).unwrap(), None)
        .unwrap();
    portable
        .gemm(a_view, b_view, &mut MatMut::dense(&mut c_portable, m, n).unwrap(), None)
        .unwrap();

    assert_eq!(c_simd, c_portable);
}

#[test]
fn test_custom_block_config() {
    // Small blocks force several M blocks, halved K and N chunks, A reuse
    let engine = Gemm::new(BlockConfig::new(24, 16, 20).unwrap()).unwrap();
    let (m, n, k) = (101, 87, 53);
    let mut rng = StdRng::seed_from_u64(5);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let mut c = vec![0.0; m * n];
    let mut expected = vec![0.0; m * n];

    gemm_naive(m, n, k, &a, k, &b, n, &mut expected, n);
    let mut scratch = engine.scratch().unwrap();
    engine
        .gemm_blocked(
            MatRef::dense(&a, m, k).unwrap(),
            MatRef::dense(&b, k, n).unwrap(),
            &mut MatMut::dense(&mut c, m, n).unwrap(),
            Some(&mut scratch),
        )
        .unwrap();

    assert_matrices_equal(&expected, &c, "custom blocks");
}

#[test]
fn test_engine_scratch_serves_every_path() {
    // Main blocks far smaller than the compact and light-pack panels
    let engine = Gemm::new(BlockConfig::new(16, 8, 8).unwrap()).unwrap();
    let mut scratch = engine.scratch().unwrap();

    for (seed, (m, n, k)) in [(12, 9, 14), (30, 32, 27), (40, 40, 40), (64, 50, 61), (90, 70, 100)]
        .into_iter()
        .enumerate()
    {
        let mut rng = StdRng::seed_from_u64(600 + seed as u64);
        let a = random_matrix(&mut rng, m * k);
        let b = random_matrix(&mut rng, k * n);
        let mut c = vec![0.0; m * n];
        let mut expected = vec![0.0; m * n];
        gemm_naive(m, n, k, &a, k, &b, n, &mut expected, n);

        let a_view = MatRef::dense(&a, m, k).unwrap();
        let b_view = MatRef::dense(&b, k, n).unwrap();
        engine
            .gemm(a_view, b_view, &mut MatMut::dense(&mut c, m, n).unwrap(), Some(&mut scratch))
            .unwrap();
        assert_matrices_equal(&expected, &c, &format!("shared arena {}x{}x{}", m, n, k));

        let mut c_small = vec![0.0; m * n];
        engine
            .gemm_small(a_view, b_view, &mut MatMut::dense(&mut c_small, m, n).unwrap(), Some(&mut scratch))
            .unwrap();
        assert_matrices_equal(&expected, &c_small, &format!("shared arena small {}x{}x{}", m, n, k));
    }

    // A·B·Aᵗ runs two products through the same arena
    let (m, k) = (40, 30);
    let mut rng = StdRng::seed_from_u64(650);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * k);
    let mut c = vec![0.0; m * m];
    let mut expected = vec![0.0; m * m];
    gemm_naive_abat(m, k, &a, k, &b, k, &mut expected, m);
    engine
        .gemm_abat(
            MatRef::dense(&a, m, k).unwrap(),
            MatRef::dense(&b, k, k).unwrap(),
            &mut MatMut::dense(&mut c, m, m).unwrap(),
            Some(&mut scratch),
        )
        .unwrap();
    assert_matrices_equal(&expected, &c, "shared arena abat");
}

// ============================================================
// Strided operands
// ============================================================

#[test]
fn test_strided_submatrices() {
    let (m, n, k) = (70, 75, 68);
    let (lda, ldb, ldc) = (80, 90, 100);
    let mut rng = StdRng::seed_from_u64(13);
    let a = random_matrix(&mut rng, m * lda);
    let b = random_matrix(&mut rng, k * ldb);
    let c0 = random_matrix(&mut rng, m * ldc);

    let mut c_naive = c0.clone();
    let mut c_fast = c0.clone();
    gemm_naive(m, n, k, &a, lda, &b, ldb, &mut c_naive, ldc);
    gemm(m, n, k, &a, lda, &b, ldb, &mut c_fast, ldc).unwrap();

    assert_matrices_equal(&c_naive, &c_fast, "strided");
    // padding columns of C are never written
    for i in 0..m {
        assert_eq!(&c_fast[i * ldc + n..(i + 1) * ldc], &c0[i * ldc + n..(i + 1) * ldc]);
    }
}

#[test]
fn test_submatrix_views() {
    let mut rng = StdRng::seed_from_u64(17);
    let big_a = random_matrix(&mut rng, 40 * 40);
    let big_b = random_matrix(&mut rng, 40 * 40);
    let mut big_c = vec![0.0; 40 * 40];

    let a = MatRef::dense(&big_a, 40, 40).unwrap().submatrix(3, 5, 21, 13).unwrap();
    let b = MatRef::dense(&big_b, 40, 40).unwrap().submatrix(7, 2, 13, 18).unwrap();
    let mut c = MatMut::dense(&mut big_c, 40, 40).unwrap().submatrix_mut(10, 20, 21, 18).unwrap();
    Gemm::default().gemm(a, b, &mut c, None).unwrap();

    let mut expected = vec![0.0; 40 * 40];
    gemm_naive(
        21,
        18,
        13,
        &big_a[3 * 40 + 5..],
        40,
        &big_b[7 * 40 + 2..],
        40,
        &mut expected[10 * 40 + 20..],
        40,
    );
    assert_matrices_equal(&expected, &big_c, "submatrix views");
}

// ============================================================
// A·Bᵗ and A·B·Aᵗ
// ============================================================

#[test]
fn test_gemm_abt() {
    for (seed, (m, n, k)) in [(3, 5, 2), (12, 16, 9), (70, 130, 45), (257, 33, 140)]
        .into_iter()
        .enumerate()
    {
        let mut rng = StdRng::seed_from_u64(400 + seed as u64);
        let a = random_matrix(&mut rng, m * k);
        let bt = random_matrix(&mut rng, n * k);
        let c0 = random_matrix(&mut rng, m * n);

        let mut c_naive = c0.clone();
        let mut c_fast = c0;
        gemm_naive_abt(m, n, k, &a, k, &bt, k, &mut c_naive, n);
        gemm_abt(m, n, k, &a, k, &bt, k, &mut c_fast, n).unwrap();

        assert_matrices_equal(&c_naive, &c_fast, &format!("abt {}x{}x{}", m, n, k));
    }
}

#[test]
fn test_gemm_abat() {
    for (seed, (m, k)) in [(1, 1), (6, 4), (33, 17), (90, 70)].into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(500 + seed as u64);
        let a = random_matrix(&mut rng, m * k);
        let b = random_matrix(&mut rng, k * k);
        let c0 = random_matrix(&mut rng, m * m);

        let mut c_naive = c0.clone();
        let mut c_fast = c0;
        gemm_naive_abat(m, k, &a, k, &b, k, &mut c_naive, m);
        gemm_abat(m, k, &a, k, &b, k, &mut c_fast, m).unwrap();

        assert_matrices_equal(&c_naive, &c_fast, &format!("abat {}x{}", m, k));
    }
}

#[test]
fn test_abat_of_symmetric_b_is_symmetric() {
    let (m, k) = (9, 6);
    let mut rng = StdRng::seed_from_u64(21);
    let a = random_matrix(&mut rng, m * k);
    let mut b = vec![0.0; k * k];
    for i in 0..k {
        for j in 0..=i {
            let v = rng.gen_range(-1.0..1.0);
            b[i * k + j] = v;
            b[j * k + i] = v;
        }
    }
    let mut c = vec![0.0; m * m];
    gemm_abat(m, k, &a, k, &b, k, &mut c, m).unwrap();

    for i in 0..m {
        for j in 0..m {
            assert!((c[i * m + j] - c[j * m + i]).abs() < 1e-12);
        }
    }
}

// ============================================================
// Errors
// ============================================================

#[test]
fn test_rejects_short_leading_dimension() {
    let a = vec![0.0; 12];
    let b = vec![0.0; 12];
    let mut c = vec![0.0; 9];
    let err = gemm(3, 3, 4, &a, 3, &b, 3, &mut c, 3).unwrap_err();
    assert_eq!(err, GemmError::InvalidLeadingDimension { ld: 3, cols: 4 });
}

#[test]
fn test_rejects_overflowing_leading_dimension() {
    let a = vec![1.0; 5];
    let b = vec![1.0; 4];
    let mut c = vec![0.0; 4];
    let ldc = 1usize << 62;

    let err = gemm(5, 4, 1, &a, 1, &b, 4, &mut c, ldc).unwrap_err();

    assert_eq!(err, GemmError::ShapeOverflow { rows: 5, cols: 4, ld: ldc });
    assert_eq!(c, vec![0.0; 4]);
}

#[test]
fn test_rejects_short_buffer() {
    let a = vec![0.0; 12];
    let b = vec![0.0; 12];
    let mut c = vec![0.0; 8];
    let err = gemm(3, 4, 4, &a, 4, &b, 4, &mut c, 4).unwrap_err();
    assert_eq!(err, GemmError::BufferTooSmall { needed: 12, len: 8 });
}

#[test]
fn test_rejects_small_scratch_without_touching_c() {
    let engine = Gemm::default();
    let (m, n, k) = (100, 100, 100);
    let a = vec![1.0; m * k];
    let b = vec![1.0; k * n];
    let mut c = vec![0.0; m * n];
    let mut scratch = Scratch::new(64).unwrap();

    let err = engine
        .gemm(
            MatRef::dense(&a, m, k).unwrap(),
            MatRef::dense(&b, k, n).unwrap(),
            &mut MatMut::dense(&mut c, m, n).unwrap(),
            Some(&mut scratch),
        )
        .unwrap_err();

    assert!(matches!(err, GemmError::ScratchTooSmall { capacity: 64, .. }));
    assert!(c.iter().all(|&x| x == 0.0));
}

#[test]
fn test_abat_rejects_non_square_b() {
    let a = vec![0.0; 6];
    let b = vec![0.0; 6];
    let mut c = vec![0.0; 4];
    let engine = Gemm::default();
    let err = engine
        .gemm_abat(
            MatRef::dense(&a, 2, 3).unwrap(),
            MatRef::dense(&b, 2, 3).unwrap(),
            &mut MatMut::dense(&mut c, 2, 2).unwrap(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, GemmError::DimensionMismatch(_)));
}

// ============================================================
// Threads: one scratch per thread, disjoint row bands of C
// ============================================================

#[test]
fn test_per_thread_scratch() {
    let (m, n, k) = (160, 96, 80);
    let mut rng = StdRng::seed_from_u64(31);
    let a = random_matrix(&mut rng, m * k);
    let b = random_matrix(&mut rng, k * n);
    let mut c = vec![0.0; m * n];
    let mut expected = vec![0.0; m * n];
    gemm_naive(m, n, k, &a, k, &b, n, &mut expected, n);

    let engine = Gemm::default();
    let b_view = MatRef::dense(&b, k, n).unwrap();
    let c_view = MatMut::dense(&mut c, m, n).unwrap();
    let (top, bottom) = c_view.split_rows_at(m / 2).unwrap();

    std::thread::scope(|s| {
        for (offset, mut band) in [(0, top), (m / 2, bottom)] {
            let a_band = MatRef::dense(&a, m, k).unwrap().submatrix(offset, 0, band.rows(), k).unwrap();
            s.spawn(move || {
                let mut scratch = engine.scratch().unwrap();
                engine.gemm(a_band, b_view, &mut band, Some(&mut scratch)).unwrap();
            });
        }
    });

    assert_matrices_equal(&expected, &c, "two threads");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn gemm_matches_reference(m in 0usize..70, n in 0usize..70, k in 0usize..70, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = random_matrix(&mut rng, m * k);
        let b = random_matrix(&mut rng, k * n);
        let c0 = random_matrix(&mut rng, m * n);

        let mut c_naive = c0.clone();
        let mut c_fast = c0;
        gemm_naive(m, n, k, &a, k, &b, n, &mut c_naive, n);
        gemm(m, n, k, &a, k, &b, n, &mut c_fast, n).unwrap();

        prop_assert_eq!(first_mismatch(&c_naive, &c_fast, DEFAULT_EPSILON), None);
    }
}

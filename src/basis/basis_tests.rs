use crate::basis::BasisLabels;

#[test]
fn test_basis_labels_select() {
    let labels = BasisLabels::new([
        "0 Fe 4s",
        "0 Fe 3dxy",
        "0 Fe 3dyz",
        "0 Fe 3dz^2",
        "1 N 2s",
        "1 N 2px",
        "1 N 2py",
        "1 N 2pz",
        "2 C 2s",
    ]);
    assert_eq!(labels.n_funcs(), 9);

    let idx = labels.select(&["Fe 3d", "Fe 4s", "N 2pz"]);
    assert_eq!(idx.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 7]);
}

#[test]
fn test_basis_labels_select_no_match() {
    let labels = BasisLabels::new(["0 H 1s", "1 H 1s"]);
    let idx = labels.select(&["Fe 3d"]);
    assert!(idx.is_empty());
}

#[test]
fn test_basis_labels_select_order_preserving() {
    let labels = BasisLabels::new(["0 N 2pz", "1 Fe 3dxy", "2 N 2pz"]);
    // Patterns are given metal-first, but the selection follows the basis
    // ordering.
    let idx = labels.select(&["Fe 3d", "N 2pz"]);
    assert_eq!(idx.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
}

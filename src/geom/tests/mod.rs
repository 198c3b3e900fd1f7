mod test_lookup_basic;
mod test_morph_basic;
mod test_placement_basic;

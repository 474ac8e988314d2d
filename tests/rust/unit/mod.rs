mod catalog_file_tests;

mod advanced;
